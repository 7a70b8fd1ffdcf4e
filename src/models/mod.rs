pub mod download;
pub mod manifest;
pub mod mirror;
pub mod pull;
pub mod tasks;
pub mod transport;

pub use download::{fetch_task, format_bytes, FetchOutcome};
pub use manifest::{model_entries, weight_paths, ModelEntry};
pub use mirror::{candidate_urls, resolve_manifest, ResolvedManifest};
pub use pull::{dry_run_lines, execute, plan, PullPlan, PullSummary, TaskReport};
pub use tasks::{collect_tasks, download_tasks, DownloadTask};
pub use transport::{HttpTransport, Transport};
