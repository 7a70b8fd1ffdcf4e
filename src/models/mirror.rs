use crate::config::schema::MirrorConfig;
use crate::error::{PullError, Result};
use crate::models::transport::Transport;
use serde_json::Value;

/// Manifest document plus the mirror that served it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    pub manifest: Value,
    pub base_url: String,
}

/// Ensure exactly one trailing slash so filenames can be appended directly
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// Build the ordered mirror list for a run.
///
/// Fallbacks are only appended when `base_url` is the configured default
/// mirror; an explicit override is used on its own.
#[must_use]
pub fn candidate_urls(base_url: &str, mirror: &MirrorConfig) -> Vec<String> {
    let primary = normalize_base_url(base_url);
    let mut candidates = vec![primary.clone()];

    if primary == normalize_base_url(&mirror.base_url) {
        for fallback in &mirror.fallbacks {
            let candidate = normalize_base_url(fallback);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Fetch `<candidate><manifest_name>` from each candidate in order.
///
/// Returns the first manifest that downloads and parses. Each failed
/// candidate contributes one line to [`PullError::ManifestUnreachable`].
pub async fn resolve_manifest<T: Transport + ?Sized>(
    transport: &T,
    candidates: &[String],
    manifest_name: &str,
) -> Result<ResolvedManifest> {
    let mut errors = Vec::new();

    for candidate in candidates {
        let manifest_url = format!("{candidate}{manifest_name}");
        println!("Fetching manifest from {manifest_url}…");

        match transport.get_json(&manifest_url).await {
            Ok(manifest) => {
                tracing::info!("Using mirror {candidate}");
                return Ok(ResolvedManifest {
                    manifest,
                    base_url: candidate.clone(),
                });
            }
            Err(e) => {
                tracing::warn!("Manifest unavailable at {manifest_url}: {e}");
                errors.push(format!("{e} at {manifest_url}"));
            }
        }
    }

    Err(PullError::ManifestUnreachable { errors })
}
