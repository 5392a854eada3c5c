use crate::domain::model::{ConversionRequest, UploadedFile, TLG_EXTENSION};
use crate::utils::error::{ConvertError, Result};

pub const NO_FILE_MESSAGE: &str = "No file uploaded";
pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Please upload a .tlg file";

/// Rejects a request before any temp file or process exists.
pub fn validate_upload(request: &ConversionRequest) -> Result<&UploadedFile> {
    let file = request
        .file
        .as_ref()
        .ok_or_else(|| ConvertError::validation(NO_FILE_MESSAGE))?;

    if !file.filename.ends_with(TLG_EXTENSION) {
        return Err(ConvertError::validation(INVALID_TYPE_MESSAGE));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_of(result: Result<&UploadedFile>) -> String {
        match result {
            Err(ConvertError::ValidationError { message }) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_tlg() {
        let request = ConversionRequest::new("trades.tlg", b"STK_TRD|...".to_vec());
        let file = validate_upload(&request).unwrap();
        assert_eq!(file.filename, "trades.tlg");
    }

    #[test]
    fn test_accepts_empty_content() {
        let request = ConversionRequest::new("empty.tlg", Vec::new());
        assert!(validate_upload(&request).is_ok());
    }

    #[test]
    fn test_rejects_missing_file() {
        assert_eq!(
            message_of(validate_upload(&ConversionRequest::empty())),
            NO_FILE_MESSAGE
        );
    }

    #[test]
    fn test_rejects_wrong_extension() {
        for name in ["notes.txt", "trades.TLG", "trades.tlg.csv", "trades", "tlg"] {
            let request = ConversionRequest::new(name, b"x".to_vec());
            assert_eq!(message_of(validate_upload(&request)), INVALID_TYPE_MESSAGE, "{}", name);
        }
    }
}
