use async_trait::async_trait;
use modelpull::config::schema::{MirrorConfig, DEFAULT_BASE_URL, DEFAULT_FALLBACKS};
use modelpull::models::{candidate_urls, execute, plan, PullSummary, TaskReport, Transport};
use modelpull::{PullError, Result};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Serves a fixed set of URLs; anything else is a 404
#[derive(Default)]
struct FakeMirror {
    bodies: HashMap<String, Vec<u8>>,
    hits: AtomicUsize,
}

impl FakeMirror {
    fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeMirror {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url)
            .cloned()
            .ok_or(PullError::Http(reqwest::StatusCode::NOT_FOUND))
    }
}

fn fallback_mirror() -> FakeMirror {
    let fallback = DEFAULT_FALLBACKS[0];
    FakeMirror::default()
        .serve(
            &format!("{fallback}models.json"),
            json!({"models": [{"file": "a.json"}, {"name": "nested/b.json"}]}).to_string(),
        )
        .serve(
            &format!("{fallback}a.json"),
            json!({"weightsManifest": [{"paths": ["a.bin", "b.bin"]}]}).to_string(),
        )
        .serve(&format!("{fallback}a.bin"), vec![0u8; 16])
        .serve(&format!("{fallback}b.bin"), vec![1u8; 8])
}

#[tokio::test]
async fn test_pull_through_fallback_mirror() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path();
    let mirror = fallback_mirror();
    let candidates = candidate_urls(DEFAULT_BASE_URL, &MirrorConfig::default());

    let pull_plan = plan(&mirror, &candidates, "models.json", dest).await.unwrap();

    assert_eq!(pull_plan.resolved.base_url, DEFAULT_FALLBACKS[0]);
    let names: Vec<String> = pull_plan
        .tasks
        .iter()
        .map(|task| task.display_path(dest))
        .collect();
    assert_eq!(names, vec!["a.json", "a.bin", "b.bin", "b.json"]);

    let mut failures = Vec::new();
    let summary = execute(&mirror, &pull_plan.tasks, dest, false, |report| {
        if let TaskReport::Failed { url, .. } = report {
            failures.push(url.clone());
        }
    })
    .await;

    // b.json is listed but not served
    assert_eq!(failures, vec![format!("{}b.json", DEFAULT_FALLBACKS[0])]);
    assert_eq!(summary.downloaded, 3);
    assert_eq!(summary.failed, 1);
    assert!(dest.join("a.bin").exists());
    assert!(!dest.join("b.json").exists());
}

#[tokio::test]
async fn test_second_run_downloads_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path();
    let mirror = fallback_mirror();
    let candidates = candidate_urls(DEFAULT_BASE_URL, &MirrorConfig::default());

    let pull_plan = plan(&mirror, &candidates, "models.json", dest).await.unwrap();
    execute(&mirror, &pull_plan.tasks, dest, false, |_| {}).await;

    let hits_before = mirror.hits();
    let summary = execute(&mirror, &pull_plan.tasks, dest, false, |_| {}).await;

    assert_eq!(
        summary,
        PullSummary {
            downloaded: 0,
            skipped: 3,
            failed: 1,
            total_bytes: 0,
        }
    );
    // Only the missing b.json is requested again
    assert_eq!(mirror.hits(), hits_before + 1);
}

#[tokio::test]
async fn test_explicit_base_url_has_no_fallbacks() {
    let temp_dir = TempDir::new().unwrap();
    let mirror = fallback_mirror();
    let candidates = candidate_urls("https://mirror.invalid/models", &MirrorConfig::default());

    let result = plan(&mirror, &candidates, "models.json", temp_dir.path()).await;

    match result {
        Err(PullError::ManifestUnreachable { errors }) => {
            assert_eq!(
                errors,
                vec!["HTTP 404 Not Found at https://mirror.invalid/models/models.json".to_string()]
            );
        }
        other => panic!("Expected ManifestUnreachable, got {other:?}"),
    }
}
