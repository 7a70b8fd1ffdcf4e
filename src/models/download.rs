use crate::error::Result;
use crate::models::tasks::DownloadTask;
use crate::models::transport::Transport;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Result of a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination already present, nothing requested
    Skipped,
    /// Body written to the destination
    Written(u64),
}

impl FetchOutcome {
    /// Bytes written by this fetch
    #[must_use]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Skipped => 0,
            Self::Written(bytes) => bytes,
        }
    }
}

/// Download a single task.
///
/// An existing destination is left alone (no request) unless `force` is set.
pub async fn fetch_task<T: Transport + ?Sized>(
    transport: &T,
    task: &DownloadTask,
    force: bool,
) -> Result<FetchOutcome> {
    if !force && task.destination.exists() {
        tracing::debug!("{} already exists", task.destination.display());
        return Ok(FetchOutcome::Skipped);
    }

    if let Some(parent) = task.destination.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Write to temporary file, then rename over the destination
    let tmp_path = partial_path(&task.destination);
    let written = match transport.write_to(&task.url, &tmp_path).await {
        Ok(written) => written,
        Err(e) => {
            if fs::remove_file(&tmp_path).await.is_ok() {
                tracing::debug!("Removed partial file {}", tmp_path.display());
            }
            return Err(e);
        }
    };
    fs::rename(&tmp_path, &task.destination).await?;

    Ok(FetchOutcome::Written(written))
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Format bytes as human-readable string
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
