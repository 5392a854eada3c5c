use crate::config::toml_config::TomlConfig;
use crate::config::{
    default_temp_dir, ServerConfig, DEFAULT_CONVERTER_PROGRAM, DEFAULT_CONVERTER_SCRIPT,
    DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_ORIGIN, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tlg-convert")]
#[command(about = "HTTP service that converts .tlg trade logs to CSV with an external converter")]
pub struct CliArgs {
    /// TOML file with [server] and [converter] sections; replaces the service flags below
    #[arg(short, long, env = "TLG_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "TLG_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "TLG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Comma separated CORS origins, `*` allows any
    #[arg(long, env = "TLG_ALLOWED_ORIGINS", value_delimiter = ',', default_value = DEFAULT_ORIGIN)]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "TLG_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Directory for per-request temp files [default: <os temp>/tlg-convert]
    #[arg(long, env = "TLG_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Converter executable, called as `<converter> [args..] <input> <output>`
    #[arg(long = "converter", env = "TLG_CONVERTER", default_value = DEFAULT_CONVERTER_PROGRAM)]
    pub converter_program: String,

    /// Comma separated arguments placed before the input/output paths
    #[arg(long, env = "TLG_CONVERTER_ARGS", value_delimiter = ',', default_value = DEFAULT_CONVERTER_SCRIPT)]
    pub converter_args: Vec<String>,

    /// Seconds before a running converter is killed
    #[arg(long, env = "TLG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Resolves the effective service config: the TOML file when `--config`
    /// is set, otherwise the flags.
    pub fn load_config(&self) -> Result<ServerConfig> {
        if let Some(path) = &self.config {
            return Ok(TomlConfig::from_file(path)?.into_server_config());
        }

        Ok(ServerConfig {
            host: self.host.clone(),
            port: self.port,
            allowed_origins: self.allowed_origins.clone(),
            max_upload_bytes: self.max_upload_bytes,
            temp_dir: self.temp_dir.clone().unwrap_or_else(default_temp_dir),
            converter_program: self.converter_program.clone(),
            converter_args: self
                .converter_args
                .iter()
                .filter(|arg| !arg.is_empty())
                .cloned()
                .collect(),
            converter_timeout_secs: self.timeout_secs,
        })
    }
}
