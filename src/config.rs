use crate::constants::{
    API_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub model: String,
    /// Directory for the local store and log files. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub mirror_enabled: bool,
    /// Seconds between pending-sync retries. 0 disables the timer.
    pub sync_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            data_dir: None,
            log_level: "info".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            mirror_enabled: false,
            sync_interval_secs: 60,
        }
    }
}

impl Config {
    /// Loads the config from the default location, writing defaults on first run.
    pub fn initialize() -> AdvisorResult<Self> {
        let path = get_config_path()?;
        let mut config = Self::load_or_create(&path)?;
        if let Ok(url) = env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        validate_config(&config)?;
        Ok(config)
    }

    pub fn load_or_create(path: &Path) -> AdvisorResult<Self> {
        if path.exists() {
            let config_str = fs::read_to_string(path).map_err(|e| {
                AdvisorError::config_error(format!("Failed to read config file: {}", e))
            })?;
            let config: Config = serde_json::from_str(&config_str).map_err(|e| {
                AdvisorError::config_error(format!("Failed to parse config: {}", e))
            })?;
            validate_config(&config)?;
            return Ok(config);
        }

        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AdvisorError::config_error(format!("Failed to create config directory: {}", e))
            })?;
        }
        let config_str = serde_json::to_string_pretty(&config)?;
        fs::write(path, config_str).map_err(|e| {
            AdvisorError::config_error(format!("Failed to write config file: {}", e))
        })?;
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("loan-advisor")
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("storage.json")
    }
}

fn get_config_path() -> AdvisorResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| AdvisorError::config_error("Could not determine home directory"))?;

    Ok(home_dir
        .join(".config")
        .join("loan-advisor")
        .join("config.json"))
}

fn validate_config(config: &Config) -> AdvisorResult<()> {
    if !(config.api_base_url.starts_with("http://") || config.api_base_url.starts_with("https://"))
    {
        return Err(AdvisorError::config_error(
            "api_base_url must be an http(s) address",
        ));
    }

    if config.model.is_empty() {
        return Err(AdvisorError::config_error("Model name is required"));
    }

    if config.request_timeout_secs == 0 {
        return Err(AdvisorError::config_error(
            "request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}
