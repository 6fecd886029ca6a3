//! gatekeeper.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[storage].path`.
pub const DB_PATH_ENV: &str = "GATEKEEPER_DB_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the redb database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// How many times to poll a new collection before giving up on it.
    #[serde(default = "default_ready_poll_attempts")]
    pub ready_poll_attempts: u32,
    #[serde(default = "default_ready_poll_interval_ms")]
    pub ready_poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("gatekeeper.redb")
}

fn default_ready_poll_attempts() -> u32 {
    25
}

fn default_ready_poll_interval_ms() -> u64 {
    200
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            ready_poll_attempts: default_ready_poll_attempts(),
            ready_poll_interval_ms: default_ready_poll_interval_ms(),
        }
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl GateConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if one is given, otherwise start from defaults, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            if !db_path.is_empty() {
                config.storage.path = PathBuf::from(db_path);
            }
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
