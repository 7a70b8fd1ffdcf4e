use crate::models::manifest::{model_entries, weight_paths, ModelEntry};
use crate::models::transport::Transport;
use futures_util::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

/// A single file to fetch: remote URL and local destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadTask {
    /// Destination relative to `dest_dir`, for display
    #[must_use]
    pub fn display_path(&self, dest_dir: &Path) -> String {
        self.destination
            .strip_prefix(dest_dir)
            .unwrap_or(&self.destination)
            .display()
            .to_string()
    }
}

/// Lazily enumerate the download tasks described by `manifest`.
///
/// Each model entry yields its own file first, then the weight shards listed
/// in that file's `weightsManifest`. The descriptor is fetched only when the
/// stream is polled past the entry's task. Descriptor failures are ignored.
/// No destination is yielded twice.
pub fn download_tasks<'a, T: Transport + ?Sized>(
    transport: &'a T,
    manifest: &'a Value,
    base_url: &'a str,
    dest_dir: &'a Path,
) -> impl Stream<Item = DownloadTask> + 'a {
    let enumeration = Enumeration {
        transport,
        base_url,
        dest_dir,
        entries: model_entries(manifest).into_iter(),
        descriptor_url: None,
        pending: VecDeque::new(),
        seen: HashSet::new(),
    };

    stream::unfold(enumeration, |mut enumeration| async move {
        let task = enumeration.next_task().await?;
        Some((task, enumeration))
    })
}

/// Enumerate every task up front
pub async fn collect_tasks<T: Transport + ?Sized>(
    transport: &T,
    manifest: &Value,
    base_url: &str,
    dest_dir: &Path,
) -> Vec<DownloadTask> {
    download_tasks(transport, manifest, base_url, dest_dir)
        .collect()
        .await
}

struct Enumeration<'a, T: ?Sized> {
    transport: &'a T,
    base_url: &'a str,
    dest_dir: &'a Path,
    entries: std::vec::IntoIter<ModelEntry<'a>>,
    /// Descriptor of the entry yielded last, not fetched yet
    descriptor_url: Option<String>,
    pending: VecDeque<DownloadTask>,
    seen: HashSet<PathBuf>,
}

impl<T: Transport + ?Sized> Enumeration<'_, T> {
    async fn next_task(&mut self) -> Option<DownloadTask> {
        loop {
            if let Some(task) = self.pending.pop_front() {
                return Some(task);
            }

            if let Some(url) = self.descriptor_url.take() {
                self.queue_weights(&url).await;
                continue;
            }

            let entry = self.entries.next()?;
            let Some(filename) = entry.filename() else {
                tracing::debug!("Skipping manifest entry without a filename: {entry:?}");
                continue;
            };

            if !is_contained(filename) {
                tracing::debug!("Skipping manifest entry outside the destination: {filename}");
                continue;
            }

            let destination = self.dest_dir.join(filename);
            if !self.seen.insert(destination.clone()) {
                continue;
            }

            let url = format!("{}{filename}", self.base_url);
            self.descriptor_url = Some(url.clone());
            return Some(DownloadTask { url, destination });
        }
    }

    async fn queue_weights(&mut self, descriptor_url: &str) {
        let descriptor = match self.transport.get_json(descriptor_url).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::debug!("No weights manifest from {descriptor_url}: {e}");
                return;
            }
        };

        for path in weight_paths(&descriptor) {
            if !is_contained(path) {
                tracing::debug!("Skipping weight path outside the destination: {path}");
                continue;
            }

            let destination = self.dest_dir.join(path);
            if self.seen.insert(destination.clone()) {
                self.pending.push_back(DownloadTask {
                    url: format!("{}{path}", self.base_url),
                    destination,
                });
            }
        }
    }
}

/// Relative path that stays under the directory it is joined onto
fn is_contained(path: &str) -> bool {
    let mut has_name = false;
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_name
}
