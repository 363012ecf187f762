use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR_PREFIX: &str = "sheets-append";

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
pub const DEFAULT_APPLICATION_NAME: &str = "sheets-append";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Identifies the signed-in account in logs; the OAuth flow does not report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl GoogleConfig {
    pub fn account_identifier(&self) -> String {
        self.account.clone().unwrap_or_else(|| "default".to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SheetsConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            application_name: default_application_name(),
            spreadsheet_id: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_application_name() -> String {
    DEFAULT_APPLICATION_NAME.to_string()
}

impl Config {
    /// Load the config file and require OAuth client credentials
    pub fn load() -> Result<Self> {
        let config = Self::read()?.ok_or_else(|| {
            AppError::Config(format!(
                "Config file not found at {:?}. Please create one.",
                Self::config_file().unwrap_or_default()
            ))
        })?;

        if config.google.client_id.is_empty() || config.google.client_secret.is_empty() {
            return Err(AppError::Config(
                "Google client_id and client_secret must be set in config file".to_string(),
            ));
        }

        Ok(config)
    }

    /// Load the config file if present, without requiring OAuth client credentials.
    ///
    /// Used when the caller already holds an access token.
    pub fn load_or_default() -> Result<Self> {
        Ok(Self::read()?.unwrap_or_default())
    }

    fn read() -> Result<Option<Self>> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::parse(&contents).map(Some)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }

    /// Get the cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.get_cache_home()
            .ok_or_else(|| AppError::Config("Failed to determine cache directory".to_string()))
    }

    /// Get a cache file path
    pub fn cache_file(filename: &str) -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.place_cache_file(filename)
            .map_err(|e| AppError::Config(format!("Failed to create cache file path: {}", e)))
    }
}
