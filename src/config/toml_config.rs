use crate::config::{default_temp_dir, ServerConfig};
use crate::utils::error::{ConvertError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File form of [`ServerConfig`]. Every key is optional; missing keys fall
/// back to the built-in defaults.
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8000
/// allowed_origins = ["https://${FRONTEND_HOST}"]
///
/// [converter]
/// program = "python3"
/// args = ["/opt/tlg/tradeconverter.py"]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub converter: ConverterSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterSection {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub temp_dir: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConvertError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConvertError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CONVERTER_SCRIPT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConvertError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self.server.host.unwrap_or(defaults.host),
            port: self.server.port.unwrap_or(defaults.port),
            allowed_origins: self
                .server
                .allowed_origins
                .unwrap_or(defaults.allowed_origins),
            max_upload_bytes: self
                .server
                .max_upload_bytes
                .unwrap_or(defaults.max_upload_bytes),
            temp_dir: self
                .converter
                .temp_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_temp_dir),
            converter_program: self.converter.program.unwrap_or(defaults.converter_program),
            converter_args: self.converter.args.unwrap_or(defaults.converter_args),
            converter_timeout_secs: self
                .converter
                .timeout_secs
                .unwrap_or(defaults.converter_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 9000
allowed_origins = ["http://localhost:3000", "https://trade-conversion.example.com"]
max_upload_bytes = 1048576

[converter]
program = "/usr/bin/python3"
args = ["/opt/tlg/tradeconverter.py"]
timeout_secs = 30
temp_dir = "/var/tmp/tlg"
"#;

        let config = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_server_config();

        assert_eq!(config.bind_address(), ("0.0.0.0", 9000));
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.max_upload_bytes, 1048576);
        assert_eq!(config.converter_program, "/usr/bin/python3");
        assert_eq!(config.converter_args, vec!["/opt/tlg/tradeconverter.py"]);
        assert_eq!(config.converter_timeout_secs, 30);
        assert_eq!(config.temp_dir, PathBuf::from("/var/tmp/tlg"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap().into_server_config();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TLG_TEST_CONVERTER_SCRIPT", "/srv/convert.py");

        let toml_content = r#"
[converter]
args = ["${TLG_TEST_CONVERTER_SCRIPT}"]
program = "${TLG_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.converter.args, Some(vec!["/srv/convert.py".to_string()]));
        assert_eq!(
            config.converter.program.as_deref(),
            Some("${TLG_TEST_UNSET_VARIABLE}")
        );

        std::env::remove_var("TLG_TEST_CONVERTER_SCRIPT");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TomlConfig::from_toml_str("[converter]\ntimeout = 5\n").unwrap_err();
        assert!(matches!(err, ConvertError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[converter]\ntimeout_secs = 0\n")
            .unwrap()
            .into_server_config();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 8123\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path())
            .unwrap()
            .into_server_config();
        assert_eq!(config.port, 8123);
    }
}
