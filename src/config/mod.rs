mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DB_FILE: &str = "notifications.db";
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 10;
/// Same order of magnitude as browser local storage.
pub const DEFAULT_SLOT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub api_base_url: String,
    pub user_id: Option<String>,
    pub request_timeout_sec: u64,
    pub slot_quota_bytes: usize,
    pub offline: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_id: None,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            slot_quota_bytes: DEFAULT_SLOT_QUOTA_BYTES,
            offline: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub api_base_url: String,
    pub user_id: Option<String>,
    pub request_timeout_sec: u64,
    pub slot_quota_bytes: Option<usize>,
    pub offline: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let api_base_url = file
            .api_base_url
            .unwrap_or_else(|| cli.api_base_url.clone())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            bail!("api_base_url must be an http(s) URL: {}", api_base_url);
        }

        let user_id = file
            .user_id
            .or_else(|| cli.user_id.clone())
            .filter(|id| !id.trim().is_empty());

        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        let slot_quota_bytes = match file.slot_quota_bytes.unwrap_or(cli.slot_quota_bytes) {
            0 => None,
            bytes => Some(bytes),
        };

        let offline = file.offline.unwrap_or(cli.offline);

        Ok(Self {
            db_path,
            api_base_url,
            user_id,
            request_timeout_sec,
            slot_quota_bytes,
            offline,
        })
    }
}
