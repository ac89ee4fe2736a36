use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::platform;
use crate::storage::BackendKind;

/// Default preview API endpoint (linkpreview.net).
pub const DEFAULT_PREVIEW_API_URL: &str = "https://api.linkpreview.net";

/// Default timeout for a preview request (30s)
pub const DEFAULT_PREVIEW_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent for preview requests
pub const DEFAULT_USER_AGENT: &str = concat!("LinkStash/", env!("CARGO_PKG_VERSION"));

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "linkstash.db";

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PREVIEW_API_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_PREVIEW_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub preview: PreviewConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("LINKSTASH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(platform::get_data_dir);

        let backend = match lookup("LINKSTASH_BACKEND") {
            Some(v) => v.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to sqlite", e);
                BackendKind::Sqlite
            }),
            None => BackendKind::Sqlite,
        };

        let timeout = lookup("LINKSTASH_PREVIEW_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PREVIEW_TIMEOUT);

        let preview = PreviewConfig {
            api_url: lookup("LINKSTASH_PREVIEW_API_URL")
                .unwrap_or_else(|| DEFAULT_PREVIEW_API_URL.to_string()),
            api_key: lookup("LINKSTASH_PREVIEW_API_KEY").unwrap_or_default(),
            timeout,
            user_agent: lookup("LINKSTASH_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        Self {
            data_dir,
            backend,
            preview,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
