use crate::domain::model::{ConverterOutcome, TempArtifactPair};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn temp_dir(&self) -> &Path;
    fn converter_program(&self) -> &str;
    fn converter_args(&self) -> &[String];
    fn converter_timeout(&self) -> Duration;
    fn max_upload_bytes(&self) -> usize;
    fn allowed_origins(&self) -> &[String];
}

/// Turns the staged input of `artifacts` into CSV at its output path.
/// Returns `Ok` only when the conversion reported success.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, artifacts: &TempArtifactPair) -> Result<ConverterOutcome>;
}
