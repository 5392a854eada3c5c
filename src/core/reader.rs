use crate::utils::error::{ConvertError, Result};
use std::path::Path;

/// Reads the converter's CSV. A missing or non-UTF-8 file is a `ReadError`,
/// never an empty success.
pub async fn read_output(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConvertError::ReadError {
            path: path.to_path_buf(),
            source,
        })
}
