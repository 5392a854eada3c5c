use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extension every upload must carry. Compared case-sensitively.
pub const TLG_EXTENSION: &str = ".tlg";
pub const CSV_EXTENSION: &str = ".csv";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// One inbound conversion. `file` is `None` when the form had no `file` field.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    pub file: Option<UploadedFile>,
}

impl ConversionRequest {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file: Some(UploadedFile {
                filename: filename.into(),
                content: content.into(),
            }),
        }
    }

    pub fn empty() -> Self {
        Self { file: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempArtifactPair {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl TempArtifactPair {
    pub fn paths(&self) -> [&Path; 2] {
        [&self.input_path, &self.output_path]
    }
}

/// What the converter process left behind. Only built for a zero exit.
#[derive(Debug, Clone)]
pub struct ConverterOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedCsv {
    pub csv_content: String,
    pub filename: String,
}

pub type ConversionResult = crate::utils::error::Result<ConvertedCsv>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validated,
    Staged,
    Converting,
    Succeeded,
    Failed,
    Cleaned,
}

impl RequestState {
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, Failed)
                | (Validated, Staged)
                | (Validated, Failed)
                | (Staged, Converting)
                | (Staged, Failed)
                | (Converting, Succeeded)
                | (Converting, Failed)
                | (Succeeded, Cleaned)
                | (Failed, Cleaned)
        )
    }
}

/// `trades.tlg` -> `trades.csv`. Anything else just gets `.csv` appended.
pub fn csv_filename_for(upload_name: &str) -> String {
    let base = upload_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(upload_name);
    match base.strip_suffix(TLG_EXTENSION) {
        Some(stem) if !stem.is_empty() => format!("{}{}", stem, CSV_EXTENSION),
        _ => format!("{}{}", base, CSV_EXTENSION),
    }
}
