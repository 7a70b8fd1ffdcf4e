use thiserror::Error;

/// Main error type for modelpull
#[derive(Error, Debug)]
pub enum PullError {
    #[error("Failed to download manifest from all mirrors:\n{}\n\nTroubleshooting:\n- Supply an alternative mirror with --base-url\n- Check proxy settings if outbound HTTPS is filtered\n- Download the models manually into the destination directory", .errors.join("\n"))]
    ManifestUnreachable { errors: Vec<String> },

    #[error("Manifest did not contain any downloadable models.\n\nTroubleshooting:\n- Check that the mirror serves the expected package version\n- Run with --verbose to see which manifest was used")]
    EmptyManifest,

    #[error("HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("{0}")]
    Network(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Config error: {0}\n\nTroubleshooting:\n- Check config file: ~/.config/modelpull/config.toml\n- Pass an explicit file with --config\n- Run with RUST_LOG=debug for more details")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for PullError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Http(status),
            None => Self::Network(e.without_url().to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PullError>;
