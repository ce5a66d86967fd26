//! Configuration management

use crate::error::{ErrorContext, RemitError, RemitResult};
use crate::logging::LoggingConfig;
use crate::types::{ApiConfig, RemitConfig, StorageConfig};

use std::path::{Path, PathBuf};

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/index.php".to_string(),
            timeout_seconds: 30,
            user_agent: format!("remit-admin/{}", env!("CARGO_PKG_VERSION")),
            profile_path: "users/profile".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.remit/data".to_string(),
            profile_cache_ttl_secs: 30 * 60,
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn resolved_data_dir(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.data_dir),
        }
    }

    pub fn profile_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.profile_cache_ttl_secs)
    }
}

impl Default for RemitConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RemitConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RemitResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RemitError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RemitConfig = toml::from_str(&content).map_err(|e| RemitError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating the parent directory if needed
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RemitResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| RemitError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| RemitError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> RemitResult<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemitError::Config {
                message: format!("api.base_url must be an http(s) URL, got '{}'", base_url),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.base_url to the backend root, e.g. https://api.example.com"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(RemitError::Config {
                message: "api.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        if self.storage.profile_cache_ttl_secs == 0 {
            return Err(RemitError::Config {
                message: "storage.profile_cache_ttl_secs must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set storage.profile_cache_ttl_secs to a positive value"),
            });
        }

        if self.storage.data_dir.trim().is_empty() {
            return Err(crate::config_error!("storage.data_dir must not be empty", "config"));
        }

        Ok(())
    }
}
