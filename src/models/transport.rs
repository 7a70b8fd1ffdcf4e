use crate::config::schema::MirrorConfig;
use crate::error::{PullError, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Unified interface for fetching remote documents
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the full body at `url`. Non-2xx responses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetch `url` and parse the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch `url` into the file at `path`, returning the bytes written
    async fn write_to(&self, url: &str, path: &Path) -> Result<u64> {
        let body = self.get_bytes(url).await?;
        fs::write(path, &body).await?;
        Ok(body.len() as u64)
    }
}

/// HTTP(S) transport backed by `reqwest`
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &"Client { ... }")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Create transport from mirror config
    pub fn new(mirror: &MirrorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(mirror.user_agent())
            .build()
            .map_err(|e| PullError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: mirror.timeout_secs.map(Duration::from_secs),
        })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PullError::Http(status));
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn write_to(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.send(url).await?;

        let mut file = fs::File::create(path).await?;
        let mut written: u64 = 0;

        // Stream the body instead of buffering whole shards
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_transport_debug_hides_client() {
        let transport = HttpTransport::new(&MirrorConfig::default()).unwrap();
        let debug = format!("{transport:?}");
        assert!(debug.contains("Client { ... }"));
        assert!(debug.contains("timeout: None"));
    }

    #[test]
    fn test_http_transport_timeout_from_config() {
        let mirror = MirrorConfig {
            timeout_secs: Some(15),
            ..MirrorConfig::default()
        };
        let transport = HttpTransport::new(&mirror).unwrap();
        assert_eq!(transport.timeout, Some(Duration::from_secs(15)));
    }

    #[tokio::test]
    async fn test_get_json_parses_body() {
        let transport =
            MemoryTransport::new().with_json("https://m/a.json", &json!({"weightsManifest": []}));

        let value = transport.get_json("https://m/a.json").await.unwrap();
        assert_eq!(value, json!({"weightsManifest": []}));
    }

    #[tokio::test]
    async fn test_get_json_rejects_invalid_body() {
        let transport = MemoryTransport::new().with("https://m/a.json", "<html>not json</html>");

        let result = transport.get_json("https://m/a.json").await;
        assert!(matches!(result, Err(PullError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn test_write_to_copies_body() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("a.bin");
        let transport = MemoryTransport::new().with("https://m/a.bin", "weights");

        let written = transport.write_to("https://m/a.bin", &path).await.unwrap();

        assert_eq!(written, 7);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "weights");
    }
}
