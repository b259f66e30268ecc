//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend address, credential storage backend, request timeout and the
//! last used username.
//!
//! Configuration is stored at `~/.config/quizdeck/config.json`.
//! `QUIZDECK_API_URL` and `QUIZDECK_WEB_URL` override the stored addresses
//! for the running process only; `save()` never writes them back.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::auth::{ClientStorage, FileStorage, KeyringStorage};
use crate::routes::Route;

/// Application name used for config/data directory paths
const APP_NAME: &str = "quizdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where the web front-end is served; used to show links for views the
/// terminal does not implement
const DEFAULT_WEB_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    #[serde(default)]
    pub storage: StorageBackend,
    /// 0 disables the timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(skip)]
    env: EnvOverrides,
}

/// Addresses taken from the environment at load time
#[derive(Debug, Clone, Default, PartialEq)]
struct EnvOverrides {
    api_base_url: Option<String>,
    web_base_url: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_web_base_url() -> String {
    DEFAULT_WEB_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            web_base_url: default_web_base_url(),
            storage: StorageBackend::default(),
            request_timeout_secs: default_request_timeout_secs(),
            last_username: None,
            env: EnvOverrides::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.env = EnvOverrides {
            api_base_url: lookup("QUIZDECK_API_URL").filter(|v| !v.is_empty()),
            web_base_url: lookup("QUIZDECK_WEB_URL").filter(|v| !v.is_empty()),
        };
    }

    /// Backend address in effect: the environment, else the stored value
    pub fn api_url(&self) -> &str {
        self.env.api_base_url.as_deref().unwrap_or(&self.api_base_url)
    }

    /// Web front-end address in effect
    pub fn web_url(&self) -> &str {
        self.env.web_base_url.as_deref().unwrap_or(&self.web_base_url)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Full web address of a client route. Quiz names are percent-encoded
    /// as single path segments.
    pub fn route_url(&self, route: &Route) -> String {
        let base = self.web_url();
        match Url::parse(base) {
            Ok(mut url) if !url.cannot_be_a_base() => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().extend(route.segments());
                }
                url.to_string()
            }
            _ => format!("{}{}", base.trim_end_matches('/'), route.path()),
        }
    }

    /// Open the configured persistent client storage
    pub fn open_storage(&self) -> Result<Box<dyn ClientStorage>> {
        Ok(match self.storage {
            StorageBackend::File => Box::new(FileStorage::new(&self.data_dir()?)),
            StorageBackend::Keyring => Box::new(KeyringStorage),
        })
    }
}
