use crate::domain::model::TempArtifactPair;
use std::io::ErrorKind;
use std::path::Path;

/// Owns a request's temp files. `release` deletes both without blocking the
/// runtime; a guard dropped before that (early return, cancelled request)
/// deletes them synchronously in `Drop`.
///
/// Removal is best effort: a file that is already gone is expected (the
/// converter may never have written its output), other failures are logged.
/// Nothing here can change the outcome of the request.
#[derive(Debug)]
pub struct ArtifactGuard {
    pair: TempArtifactPair,
    released: bool,
}

impl ArtifactGuard {
    pub fn acquire(pair: TempArtifactPair) -> Self {
        Self {
            pair,
            released: false,
        }
    }

    pub fn pair(&self) -> &TempArtifactPair {
        &self.pair
    }

    /// Deletes the artifacts now and returns how many files were removed.
    pub async fn release(mut self) -> usize {
        let mut removed = 0;
        for path in self.pair.paths() {
            if log_removal(path, tokio::fs::remove_file(path).await) {
                removed += 1;
            }
        }
        // only now: if this future is dropped mid-way, Drop retries
        self.released = true;
        removed
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        remove_artifacts(&self.pair);
    }
}

fn remove_artifacts(pair: &TempArtifactPair) {
    for path in pair.paths() {
        log_removal(path, std::fs::remove_file(path));
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Temp artifact already absent");
            false
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to remove temp artifact: {}", e);
            false
        }
    }
}
