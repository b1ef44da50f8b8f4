use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};

pub const ENV_PREFIX: &str = "PATIENT_INTAKE_";
pub const CONFIG_PATH_ENV: &str = "PATIENT_INTAKE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "patient_intake.toml";

/// Service configuration.
///
/// Layered as: built-in defaults, then the optional TOML file, then
/// `PATIENT_INTAKE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Directory holding one JSON file per dataset
    #[validate(length(min = 1, message = "storage_dir must not be empty"))]
    pub storage_dir: String,

    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "port must be non-zero"))]
    pub port: u16,

    /// Request header carrying the access token
    #[validate(length(min = 1, message = "token_header must not be empty"))]
    pub token_header: String,

    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: "./user_data".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            token_header: "Authorization".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_figment(Self::figment(&path))
    }

    pub fn figment(config_path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_toml(toml: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_figment(with_toml("")).unwrap();
        assert_eq!(config.storage_dir, "./user_data");
        assert_eq!(config.port, 8000);
        assert_eq!(config.token_header, "Authorization");
        assert_eq!(config.storage_path(), PathBuf::from("./user_data"));
    }

    #[test]
    fn test_toml_overrides() {
        let config = AppConfig::from_figment(with_toml(
            "storage_dir = \"/var/lib/intake\"\nport = 9100\ntoken_header = \"X-Access-Token\"",
        ))
        .unwrap();
        assert_eq!(config.storage_dir, "/var/lib/intake");
        assert_eq!(config.port, 9100);
        assert_eq!(config.token_header, "X-Access-Token");
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let err = AppConfig::from_figment(with_toml("port = 0")).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_validation_rejects_empty_storage_dir() {
        let err = AppConfig::from_figment(with_toml("storage_dir = \"\"")).unwrap_err();
        match err {
            AppError::ConfigError(msg) => assert!(msg.contains("storage_dir")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_is_config_error() {
        let err = AppConfig::from_figment(with_toml("port = \"eighty\"")).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("/nonexistent/patient_intake.toml"));
        assert_eq!(AppConfig::from_figment(figment).unwrap().port, 8000);
    }
}
