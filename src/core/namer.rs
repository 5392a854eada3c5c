use crate::domain::model::{TempArtifactPair, CSV_EXTENSION, TLG_EXTENSION};
use crate::utils::error::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

const ARTIFACT_PREFIX: &str = "tlg";

/// Hands out per-request temp paths inside one directory.
///
/// Each name combines the wall clock in nanoseconds, a process-wide sequence
/// number and a random UUID, so two calls never produce the same pair even
/// when they land on the same clock tick. The upload's own filename is never
/// part of the path.
#[derive(Debug)]
pub struct TempArtifactNamer {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl TempArtifactNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the temp directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn next_pair(&self) -> TempArtifactPair {
        let token = self.next_token();
        TempArtifactPair {
            input_path: self.dir.join(format!("{}{}", token, TLG_EXTENSION)),
            output_path: self.dir.join(format!("{}{}", token, CSV_EXTENSION)),
        }
    }

    fn next_token(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1_000));
        format!(
            "{}_{}_{}_{}",
            ARTIFACT_PREFIX,
            nanos,
            seq,
            Uuid::new_v4().simple()
        )
    }
}
