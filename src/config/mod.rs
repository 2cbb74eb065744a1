//! Configuration management module
//!
//! Settings come from an optional TOML file in the platform config directory,
//! overridden by `CTICKER_*` environment variables. The watchlist lives in
//! its own plain-text file, see [`watchlist`].

pub mod watchlist;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use watchlist::{Watchlist, WatchlistError};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Binance-specific configuration
    pub binance: BinanceConfig,

    /// Background refresh configuration
    pub refresh: RefreshConfig,

    /// UI-specific configuration
    pub ui: UiConfig,

    /// File-based logging configuration
    pub log: LogConfig,

    /// Watchlist file location; `$HOME/.cticker.conf` when unset
    pub watchlist_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BinanceConfig {
    /// REST API base URL
    pub rest_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between refresh cycles
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Longest wait for input before redrawing
    pub input_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory holding the daily rolling log files
    pub directory: PathBuf,

    /// Default level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.binance.com".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            input_timeout_ms: 1000,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let directory = project_dirs()
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        Self {
            directory,
            level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cticker")
}

impl Settings {
    /// `settings.toml` in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;

        let mut settings: Settings = toml::from_str(&content).with_context(|| {
            format!("Failed to parse settings file: {}", path.as_ref().display())
        })?;

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings with fallback to defaults.
    ///
    /// A missing file is not an error; an unreadable or invalid one is
    /// reported through `warnings` because logging is not up yet.
    pub fn load_or_default<P: AsRef<Path>>(path: P, warnings: &mut Vec<String>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::load_from_file(path) {
                Ok(settings) => return settings,
                Err(err) => warnings.push(format!("Failed to load settings: {err:#}, using defaults")),
            }
        }

        let mut settings = Self::default();
        settings.apply_env_overrides();
        if let Err(err) = settings.validate() {
            warnings.push(format!("Ignoring environment overrides: {err:#}"));
            settings = Self::default();
        }
        settings
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // CTICKER_REST_URL - REST API URL
        if let Some(rest_url) = lookup("CTICKER_REST_URL") {
            self.binance.rest_url = rest_url;
        }

        // CTICKER_TIMEOUT_SECONDS - request timeout
        if let Some(value) = lookup("CTICKER_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.binance.timeout_seconds = value;
        }

        // CTICKER_REFRESH_INTERVAL_SECS - refresh cadence
        if let Some(value) = lookup("CTICKER_REFRESH_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.refresh.interval_secs = value;
        }

        // CTICKER_LOG_LEVEL - logging level
        if let Some(level) = lookup("CTICKER_LOG_LEVEL") {
            self.log.level = level;
        }

        // CTICKER_LOG_DIR - logging directory
        if let Some(dir) = lookup("CTICKER_LOG_DIR").filter(|d| !d.trim().is_empty()) {
            self.log.directory = PathBuf::from(dir);
        }

        // CTICKER_WATCHLIST - watchlist file
        if let Some(path) = lookup("CTICKER_WATCHLIST").filter(|p| !p.trim().is_empty()) {
            self.watchlist_path = Some(PathBuf::from(path));
        }
    }

    /// Save settings to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content).with_context(|| {
            format!("Failed to write settings file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.binance.rest_url.trim().is_empty() {
            anyhow::bail!("binance.rest_url must not be empty");
        }

        if self.binance.timeout_seconds == 0 {
            anyhow::bail!("Timeout must be greater than 0");
        }

        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh.interval_secs must be greater than 0");
        }

        if self.ui.input_timeout_ms == 0 {
            anyhow::bail!("ui.input_timeout_ms must be greater than 0");
        }

        if self.log.directory.as_os_str().is_empty() {
            anyhow::bail!("Log directory must not be empty");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.binance.timeout_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    pub fn input_timeout(&self) -> Duration {
        Duration::from_millis(self.ui.input_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.refresh_interval(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.input_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str("[refresh]\ninterval_secs = 15\n").unwrap();
        assert_eq!(settings.refresh.interval_secs, 15);
        assert_eq!(settings.binance.rest_url, "https://api.binance.com");
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CTICKER_REST_URL", "http://localhost:9000"),
            ("CTICKER_TIMEOUT_SECONDS", "3"),
            ("CTICKER_REFRESH_INTERVAL_SECS", "not-a-number"),
            ("CTICKER_WATCHLIST", "/tmp/list.conf"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.binance.rest_url, "http://localhost:9000");
        assert_eq!(settings.binance.timeout_seconds, 3);
        assert_eq!(settings.refresh.interval_secs, 5);
        assert_eq!(settings.watchlist_path, Some(PathBuf::from("/tmp/list.conf")));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut settings = Settings::default();
        settings.refresh.interval_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_file_operations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.refresh.interval_secs = 30;

        settings.save_to_file(&path).unwrap();
        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.refresh.interval_secs, 30);
    }

    #[test]
    fn test_load_or_default_reports_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[refresh]\ninterval_secs = \"soon\"\n").unwrap();

        let mut warnings = Vec::new();
        let settings = Settings::load_or_default(&path, &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert!(settings.validate().is_ok());
    }
}
