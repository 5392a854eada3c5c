use crate::core::cleanup::ArtifactGuard;
use crate::core::converter::ProcessConverter;
use crate::core::namer::TempArtifactNamer;
use crate::core::reader::read_output;
use crate::core::upload::validate_upload;
use crate::core::{ConfigProvider, Converter};
use crate::domain::model::{
    csv_filename_for, ConversionRequest, ConversionResult, ConvertedCsv, RequestState,
    TempArtifactPair,
};
use crate::utils::error::{ConvertError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::Instrument;
use uuid::Uuid;

/// One upload in, one CSV (or error) out, with no temp files left behind.
///
/// Requests share nothing but the namer's atomic counter, so any number of
/// conversions may run at once, each with its own child process.
pub struct ConversionService {
    namer: TempArtifactNamer,
    converter: Arc<dyn Converter>,
}

impl ConversionService {
    pub fn new(namer: TempArtifactNamer, converter: Arc<dyn Converter>) -> Self {
        Self { namer, converter }
    }

    /// Builds the service around a [`ProcessConverter`] and creates the temp
    /// directory.
    pub async fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let namer = TempArtifactNamer::new(config.temp_dir());
        namer.ensure_dir().await?;
        Ok(Self::new(namer, Arc::new(ProcessConverter::from_config(config))))
    }

    pub fn temp_dir(&self) -> &Path {
        self.namer.dir()
    }

    pub async fn convert(&self, request: ConversionRequest) -> ConversionResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("convert", %request_id);
        self.handle(request).instrument(span).await
    }

    async fn handle(&self, request: ConversionRequest) -> ConversionResult {
        let started = Instant::now();
        let mut state = StateTracker::new();

        let file = match validate_upload(&request) {
            Ok(file) => file,
            Err(e) => {
                state.advance(RequestState::Failed);
                state.advance(RequestState::Cleaned);
                tracing::info!("🚫 Upload rejected: {}", e);
                return Err(e);
            }
        };
        state.advance(RequestState::Validated);
        tracing::info!(
            filename = %file.filename,
            bytes = file.content.len(),
            "📥 Upload accepted"
        );

        let guard = ArtifactGuard::acquire(self.namer.next_pair());
        let outcome = self
            .stage_and_convert(&file.content, guard.pair(), &mut state)
            .await;

        state.advance(if outcome.is_ok() {
            RequestState::Succeeded
        } else {
            RequestState::Failed
        });
        let removed = guard.release().await;
        state.advance(RequestState::Cleaned);
        tracing::debug!(removed, "Temp artifacts cleaned");

        match outcome {
            Ok(csv_content) => {
                tracing::info!(
                    csv_bytes = csv_content.len(),
                    elapsed = ?started.elapsed(),
                    "✅ Conversion succeeded"
                );
                Ok(ConvertedCsv {
                    csv_content,
                    filename: csv_filename_for(&file.filename),
                })
            }
            Err(e) => {
                tracing::error!(
                    category = ?e.category(),
                    elapsed = ?started.elapsed(),
                    "❌ Conversion failed: {}",
                    e
                );
                tracing::debug!("💡 {}", e.recovery_suggestion());
                Err(e)
            }
        }
    }

    async fn stage_and_convert(
        &self,
        content: &[u8],
        artifacts: &TempArtifactPair,
        state: &mut StateTracker,
    ) -> Result<String> {
        stage_input(&artifacts.input_path, content).await?;
        state.advance(RequestState::Staged);

        state.advance(RequestState::Converting);
        let outcome = self.converter.convert(artifacts).await?;
        tracing::debug!(
            exit_code = outcome.exit_code,
            elapsed = ?outcome.elapsed,
            stdout = %outcome.stdout.trim(),
            "Converter finished"
        );

        read_output(&artifacts.output_path).await
    }
}

/// Writes the upload to a path that must not exist yet.
async fn stage_input(path: &Path, content: &[u8]) -> Result<()> {
    let staging_error = |source: std::io::Error| ConvertError::StagingError {
        path: PathBuf::from(path),
        source,
    };

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(staging_error)?;
    file.write_all(content).await.map_err(staging_error)?;
    file.flush().await.map_err(staging_error)?;
    Ok(())
}

struct StateTracker {
    state: RequestState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: RequestState::Received,
        }
    }

    fn advance(&mut self, next: RequestState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "state");
        self.state = next;
    }
}
