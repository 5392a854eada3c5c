pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::http::{configure, start_server, HttpState};
pub use config::{toml_config::TomlConfig, ServerConfig};
pub use core::{
    converter::ProcessConverter, namer::TempArtifactNamer, service::ConversionService,
};
pub use domain::model::{ConversionRequest, ConvertedCsv, TempArtifactPair};
pub use utils::error::{ConvertError, Result};
