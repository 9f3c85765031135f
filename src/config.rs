//! Configuration: admin credentials, storage image, display mode.
//!
//! Search order: `--config` path, then `./idcon.toml`, then
//! `~/.idcon/config.toml`. Admin credentials can be rotated without a
//! rebuild through the config file or the `IDCON_ADMIN_ID` /
//! `IDCON_ADMIN_PW` environment variables.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::DEFAULT_CAPACITY;

pub const ADMIN_ID_ENV: &str = "IDCON_ADMIN_ID";
pub const ADMIN_PW_ENV: &str = "IDCON_ADMIN_PW";

/// Credential pair checked by the admin gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_id")]
    pub id: u32,
    #[serde(default = "default_admin_password")]
    pub password: u32,
}

fn default_admin_id() -> u32 {
    1234
}

fn default_admin_password() -> u32 {
    1234
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            id: default_admin_id(),
            password: default_admin_password(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_store_size")]
    pub size: usize,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("idcon.eep")
}

fn default_store_size() -> usize {
    DEFAULT_CAPACITY
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            size: default_store_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Off,
    Log,
}

impl DisplayMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" => Some(Self::Off),
            "log" => Some(Self::Log),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayMode,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin: AdminConfig::default(),
            storage: StorageConfig::default(),
            display: DisplayMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the first config file found, or defaults when none exists.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("idcon.toml");
        if local.exists() {
            return Self::load_from(&local);
        }
        if let Some(home) = dirs::home_dir() {
            let user = home.join(".idcon").join("config.toml");
            if user.exists() {
                return Self::load_from(&user);
            }
        }
        Ok(Self::default())
    }

    /// Applies credential overrides from the environment. Malformed
    /// values are ignored with a warning rather than half-applied.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(ADMIN_ID_ENV) {
            match value.parse::<u32>() {
                Ok(id) => self.admin.id = id,
                Err(_) => tracing::warn!(var = ADMIN_ID_ENV, "ignoring non-numeric override"),
            }
        }
        if let Ok(value) = std::env::var(ADMIN_PW_ENV) {
            match value.parse::<u32>() {
                Ok(pw) => self.admin.password = pw,
                Err(_) => tracing::warn!(var = ADMIN_PW_ENV, "ignoring non-numeric override"),
            }
        }
    }
}
