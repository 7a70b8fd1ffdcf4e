//! Run orchestration: resolve the manifest, plan tasks, fetch them in order.

use crate::error::{PullError, Result};
use crate::models::download::{fetch_task, format_bytes, FetchOutcome};
use crate::models::mirror::{resolve_manifest, ResolvedManifest};
use crate::models::tasks::{collect_tasks, DownloadTask};
use crate::models::transport::Transport;
use std::fmt;
use std::path::Path;

/// Resolved manifest and the tasks derived from it
#[derive(Debug)]
pub struct PullPlan {
    pub resolved: ResolvedManifest,
    pub tasks: Vec<DownloadTask>,
}

/// Resolve the manifest from `candidates` and enumerate its tasks.
///
/// Fails with [`PullError::ManifestUnreachable`] or
/// [`PullError::EmptyManifest`].
pub async fn plan<T: Transport + ?Sized>(
    transport: &T,
    candidates: &[String],
    manifest_name: &str,
    dest_dir: &Path,
) -> Result<PullPlan> {
    let resolved = resolve_manifest(transport, candidates, manifest_name).await?;
    let tasks = collect_tasks(transport, &resolved.manifest, &resolved.base_url, dest_dir).await;

    if tasks.is_empty() {
        return Err(PullError::EmptyManifest);
    }

    tracing::info!("{} files listed by {}", tasks.len(), resolved.base_url);
    Ok(PullPlan { resolved, tasks })
}

/// Outcome of one task
#[derive(Debug)]
pub enum TaskReport {
    Downloaded { path: String, bytes: u64 },
    Skipped { path: String },
    Failed { url: String, error: PullError },
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { path, bytes } => {
                write!(f, "✔ Downloaded {path} ({})", format_bytes(*bytes))
            }
            Self::Skipped { path } => write!(f, "• Skipped {path} (already exists)"),
            Self::Failed { url, error } => write!(f, "✖ Failed to download {url}: {error}"),
        }
    }
}

/// Totals over a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PullSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

impl PullSummary {
    pub fn record(&mut self, report: &TaskReport) {
        match report {
            TaskReport::Downloaded { bytes, .. } => {
                self.downloaded += 1;
                self.total_bytes += bytes;
            }
            TaskReport::Skipped { .. } => self.skipped += 1,
            TaskReport::Failed { .. } => self.failed += 1,
        }
    }
}

/// Fetch every task in order. Failures are reported, never propagated.
pub async fn execute<T, F>(
    transport: &T,
    tasks: &[DownloadTask],
    dest_dir: &Path,
    force: bool,
    mut on_report: F,
) -> PullSummary
where
    T: Transport + ?Sized,
    F: FnMut(&TaskReport),
{
    let mut summary = PullSummary::default();

    for task in tasks {
        let report = match fetch_task(transport, task, force).await {
            Ok(FetchOutcome::Skipped) => TaskReport::Skipped {
                path: task.display_path(dest_dir),
            },
            Ok(FetchOutcome::Written(bytes)) => TaskReport::Downloaded {
                path: task.display_path(dest_dir),
                bytes,
            },
            Err(error) => {
                tracing::warn!("Failed to download {}: {error}", task.url);
                TaskReport::Failed {
                    url: task.url.clone(),
                    error,
                }
            }
        };

        summary.record(&report);
        on_report(&report);
    }

    summary
}

/// Final line printed after a run
#[must_use]
pub fn summary_line(summary: &PullSummary, dest_dir: &Path) -> String {
    format!(
        "Done. Saved files into {} (downloaded {} bytes, {}; {} new, {} skipped, {} failed).",
        dest_dir.display(),
        summary.total_bytes,
        format_bytes(summary.total_bytes),
        summary.downloaded,
        summary.skipped,
        summary.failed
    )
}

/// Listing printed by a dry run: one line per task with its local status
#[must_use]
pub fn dry_run_lines(tasks: &[DownloadTask], dest_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!("Files listed by the manifest ({}):", tasks.len())];
    lines.extend(tasks.iter().map(|task| {
        let status = if task.destination.exists() {
            "[present]"
        } else {
            "[missing]"
        };
        format!("  {status} {} -> {}", task.url, task.display_path(dest_dir))
    }));
    lines
}
