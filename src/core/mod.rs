pub mod cleanup;
pub mod converter;
pub mod namer;
pub mod reader;
pub mod service;
pub mod upload;

pub use crate::domain::model::{
    ConversionRequest, ConversionResult, ConvertedCsv, ConverterOutcome, TempArtifactPair,
};
pub use crate::domain::ports::{ConfigProvider, Converter};
pub use crate::utils::error::Result;
