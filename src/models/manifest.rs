use serde_json::{Map, Value};

/// Keys that mark an object as a model entry, in filename priority order
const ENTRY_KEYS: [&str; 3] = ["file", "name", "url"];

/// A manifest object referencing a downloadable model file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelEntry<'a>(&'a Map<String, Value>);

impl<'a> ModelEntry<'a> {
    /// Wrap `map` if it carries at least one string-valued entry key
    #[must_use]
    pub fn from_map(map: &'a Map<String, Value>) -> Option<Self> {
        ENTRY_KEYS
            .iter()
            .any(|key| map.get(*key).is_some_and(Value::is_string))
            .then_some(Self(map))
    }

    /// Final path segment of the first non-empty `file`, `name` or `url`
    #[must_use]
    pub fn filename(&self) -> Option<&'a str> {
        ENTRY_KEYS
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .and_then(last_segment)
    }
}

fn last_segment(reference: &str) -> Option<&str> {
    reference.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Depth-first, pre-order search for model entries below `node`.
///
/// An entry is not descended into. Objects are walked in document order.
#[must_use]
pub fn collect_model_entries(node: &Value) -> Vec<ModelEntry<'_>> {
    let mut entries = Vec::new();
    visit(node, &mut entries);
    entries
}

fn visit<'a>(node: &'a Value, entries: &mut Vec<ModelEntry<'a>>) {
    match node {
        Value::Object(map) => {
            if let Some(entry) = ModelEntry::from_map(map) {
                entries.push(entry);
                return;
            }
            for value in map.values() {
                visit(value, entries);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit(item, entries);
            }
        }
        _ => {}
    }
}

/// Model entries of a manifest.
///
/// Looks under `models` then `files`; when neither yields anything the
/// whole document is scanned.
#[must_use]
pub fn model_entries(manifest: &Value) -> Vec<ModelEntry<'_>> {
    let mut entries: Vec<ModelEntry<'_>> = ["models", "files"]
        .iter()
        .filter_map(|key| manifest.get(*key))
        .flat_map(collect_model_entries)
        .collect();

    if entries.is_empty() {
        tracing::debug!("No entries under models/files, scanning whole manifest");
        entries = collect_model_entries(manifest);
    }

    entries
}

/// Weight shard paths listed in a model descriptor's `weightsManifest`
#[must_use]
pub fn weight_paths(descriptor: &Value) -> Vec<&str> {
    descriptor
        .get("weightsManifest")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|group| group.get("paths").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .collect()
}
