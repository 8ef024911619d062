use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub api_base_url: Option<String>,
    pub user_id: Option<String>,
    pub request_timeout_sec: Option<u64>,
    /// Largest serialized collection accepted by the slot. 0 disables the limit.
    pub slot_quota_bytes: Option<usize>,
    pub offline: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
