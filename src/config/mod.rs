//! Configuration system for Gaugedash

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{Credentials, PollSettings};

/// Global application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub display: DisplayConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gaugedash").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }
        if self.polling.interval_ms == 0 {
            anyhow::bail!("polling.interval_ms must be greater than zero");
        }
        if self.polling.timeout_ms == 0 {
            anyhow::bail!("polling.timeout_ms must be greater than zero");
        }
        if self.polling.error_threshold == 0 {
            anyhow::bail!("polling.error_threshold must be at least 1");
        }
        if !(self.display.easing > 0.0 && self.display.easing <= 1.0) {
            anyhow::bail!("display.easing must be in (0, 1], got {}", self.display.easing);
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            host: self.server.host.clone(),
            port: self.server.port,
            id: self.server.id.clone(),
            password: self.server.password.clone(),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.polling.interval_ms),
            error_threshold: self.polling.error_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub id: String,
    #[serde(alias = "pass")]
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            id: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub path: String,
    pub interval_ms: u64,
    pub error_threshold: u32,
    pub timeout_ms: u64,
    /// Forget throughput peaks when a new session replaces the old one
    pub reset_peaks_on_reconnect: bool,
    pub disk_index: usize,
    pub network_index: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            path: "/v1/all".to_string(),
            interval_ms: 1000,
            error_threshold: 5,
            timeout_ms: 3000,
            reset_peaks_on_reconnect: false,
            disk_index: 0,
            network_index: 0,
        }
    }
}

impl PollingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: String,
    pub frame_interval_ms: u64,
    pub easing: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "tokyo-night".to_string(),
            frame_interval_ms: 33,
            easing: crate::metrics::gauge::DEFAULT_EASING,
        }
    }
}

/// Write a default configuration file
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}
