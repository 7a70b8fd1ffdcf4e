//! Configuration module for modelpull
//!
//! Loads config from `$XDG_CONFIG_HOME/modelpull/config.toml` or the platform config directory.
//! Falls back to embedded defaults if the file doesn't exist.
//! Partial configs are merged with defaults using serde's default attributes.
//!
//! # Example
//!
//! ```no_run
//! use modelpull::config::Config;
//!
//! let config = Config::load().expect("Failed to load config");
//! println!("Mirror: {}", config.mirror.base_url);
//! println!("Destination: {}", config.download.dest.display());
//! ```

pub mod schema;

pub use schema::{config_path, Config, DEFAULT_BASE_URL};
