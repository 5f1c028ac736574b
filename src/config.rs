//! Application configuration.
//!
//! Stored with `confy` under the `shufumate` application name. A missing or
//! unreadable file falls back to defaults; the app never fails to start over
//! configuration.

use crate::settings::Theme;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

const CONFIG_NAME: &str = "shufumate";

/// Overrides `deals_sheet_url` when set
pub const SHEET_URL_ENV: &str = "SHUFUMATE_SHEET_URL";

/// Published CSV export of the community deals sheet
pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1cLT1eqx7A-XpPvuUSqwxayfXpu5j0xy3YV3opDmcgfU/export?format=csv";

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub deals_sheet_url: String,
    /// Theme the TUI starts with; in-session changes are not written back
    pub theme: Theme,
    /// TUI log destination. Without it, TUI logs are discarded.
    pub log_file: Option<PathBuf>,
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            deals_sheet_url: DEFAULT_SHEET_URL.to_string(),
            theme: Theme::default(),
            log_file: None,
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of the stored values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(SHEET_URL_ENV) {
            if !url.trim().is_empty() {
                self.deals_sheet_url = url;
            }
        }
        self
    }
}

/// What was read from disk, kept apart from the environment overrides so the
/// file is never rewritten with a temporary value. A load error is held until
/// logging is up.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub stored: AppConfig,
    pub load_error: Option<String>,
}

impl LoadedConfig {
    pub fn from_result<E: std::fmt::Display>(result: Result<AppConfig, E>) -> Self {
        match result {
            Ok(stored) => LoadedConfig { stored, load_error: None },
            Err(error) => LoadedConfig {
                stored: AppConfig::default(),
                load_error: Some(error.to_string()),
            },
        }
    }

    /// Stored values with environment overrides applied
    pub fn effective(&self) -> AppConfig {
        self.stored.clone().with_env_overrides()
    }

    pub fn log_load_error(&self) {
        if let Some(error) = &self.load_error {
            warn!(%error, "could not load config, using defaults");
        }
    }
}

pub fn load_config() -> LoadedConfig {
    LoadedConfig::from_result(confy::load(CONFIG_NAME, None))
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

pub fn config_path() -> Option<PathBuf> {
    confy::get_configuration_file_path(CONFIG_NAME, None).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.deals_sheet_url, DEFAULT_SHEET_URL);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.server_addr, DEFAULT_SERVER_ADDR);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"theme": "dark"}"#).unwrap();

        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.deals_sheet_url, DEFAULT_SHEET_URL);
        assert_eq!(config.version, 1);
    }

    #[test]
    fn test_load_error_falls_back_to_defaults() {
        let loaded = LoadedConfig::from_result(Err::<AppConfig, _>("bad toml"));

        assert_eq!(loaded.stored, AppConfig::default());
        assert_eq!(loaded.load_error.as_deref(), Some("bad toml"));
    }

    #[test]
    fn test_env_override_stays_out_of_stored_config() {
        let loaded = LoadedConfig::from_result(Ok::<_, String>(AppConfig::default()));

        std::env::set_var(SHEET_URL_ENV, "/tmp/local_deals.csv");
        let effective = loaded.effective();
        std::env::remove_var(SHEET_URL_ENV);

        assert_eq!(effective.deals_sheet_url, "/tmp/local_deals.csv");
        assert_eq!(loaded.stored.deals_sheet_url, DEFAULT_SHEET_URL);
        assert!(loaded.load_error.is_none());
    }
}
