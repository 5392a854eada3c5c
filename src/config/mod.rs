#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_origin, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CONVERTER_PROGRAM: &str = "python3";
pub const DEFAULT_CONVERTER_SCRIPT: &str = "tradeconverter.py";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const MAX_TIMEOUT_SECS: u64 = 3600;

pub fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("tlg-convert")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub temp_dir: PathBuf,
    pub converter_program: String,
    pub converter_args: Vec<String>,
    pub converter_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            temp_dir: default_temp_dir(),
            converter_program: DEFAULT_CONVERTER_PROGRAM.to_string(),
            converter_args: vec![DEFAULT_CONVERTER_SCRIPT.to_string()],
            converter_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl ConfigProvider for ServerConfig {
    fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn converter_program(&self) -> &str {
        &self.converter_program
    }

    fn converter_args(&self) -> &[String] {
        &self.converter_args
    }

    fn converter_timeout(&self) -> Duration {
        Duration::from_secs(self.converter_timeout_secs)
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.host)?;
        validate_positive_number("server.port", self.port as usize, 1)?;
        validate_positive_number("server.max_upload_bytes", self.max_upload_bytes, 1)?;
        for origin in &self.allowed_origins {
            validate_origin("server.allowed_origins", origin)?;
        }

        validate_path("converter.temp_dir", &self.temp_dir.to_string_lossy())?;
        validate_non_empty_string("converter.program", &self.converter_program)?;
        validate_range(
            "converter.timeout_secs",
            self.converter_timeout_secs,
            1,
            MAX_TIMEOUT_SECS,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), ("127.0.0.1", 8000));
        assert_eq!(config.converter_timeout(), Duration::from_secs(60));
        assert_eq!(config.converter_args(), ["tradeconverter.py".to_string()]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = ServerConfig::default();
        config.converter_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.converter_program = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.allowed_origins = vec!["not a url".to_string()];
        assert!(config.validate().is_err());
    }
}
