use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NetViewError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub external_ip: ExternalIpConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_network_interval_ms")]
    pub network_interval_ms: u64,
    #[serde(default = "default_aux_interval_secs")]
    pub aux_interval_secs: u64,
    #[serde(default = "default_external_ip_interval_secs")]
    pub external_ip_interval_secs: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIpConfig {
    #[serde(default = "default_external_ip_enabled")]
    pub enabled: bool,
    #[serde(default = "default_external_ip_url")]
    pub url: String,
    /// Honour HTTP_PROXY / HTTPS_PROXY / ALL_PROXY
    #[serde(default = "default_external_ip_env_proxy")]
    pub use_env_proxy: bool,
    #[serde(default = "default_external_ip_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_process_limit")]
    pub process_limit: usize,
}

fn default_network_interval_ms() -> u64 { 1000 }
fn default_aux_interval_secs() -> u64 { 5 }
fn default_external_ip_interval_secs() -> u64 { 30 }
fn default_tick_rate_ms() -> u64 { 250 }
fn default_external_ip_enabled() -> bool { true }
fn default_external_ip_url() -> String { "https://api.ipify.org".to_string() }
fn default_external_ip_env_proxy() -> bool { true }
fn default_external_ip_timeout_ms() -> u64 { 4000 }
fn default_process_limit() -> usize { 80 }

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            network_interval_ms: default_network_interval_ms(),
            aux_interval_secs: default_aux_interval_secs(),
            external_ip_interval_secs: default_external_ip_interval_secs(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Default for ExternalIpConfig {
    fn default() -> Self {
        Self {
            enabled: default_external_ip_enabled(),
            url: default_external_ip_url(),
            use_env_proxy: default_external_ip_env_proxy(),
            timeout_ms: default_external_ip_timeout_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            process_limit: default_process_limit(),
        }
    }
}

impl RefreshConfig {
    pub fn network_interval(&self) -> Duration {
        Duration::from_millis(self.network_interval_ms.max(100))
    }

    pub fn aux_interval(&self) -> Duration {
        Duration::from_secs(self.aux_interval_secs.max(1))
    }

    pub fn external_ip_interval(&self) -> Duration {
        Duration::from_secs(self.external_ip_interval_secs.max(1))
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}

impl ExternalIpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(100))
    }
}

impl Config {
    /// Loads the config from `path`, or from the default location when `path`
    /// is `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content).map_err(|e| {
            NetViewError::Config(format!(
                "failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config/netview/config.toml"))
    }
}
