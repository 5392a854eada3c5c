use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Failed to stage upload at {path}: {source}")]
    StagingError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start converter '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {status}: {stderr}", status = describe_exit(.exit_code))]
    ConversionError {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to read converter output {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lost track of converter '{program}': {source}")]
    WaitError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter timed out after {after:?}")]
    TimeoutError { after: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing input from the caller.
    Validation,
    /// The service environment is broken (temp dir, executable, permissions).
    Environment,
    /// The converter rejected the content.
    Content,
    /// The converter claimed success but broke its output contract.
    ConverterContract,
    Timeout,
    Configuration,
}

impl ConvertError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConvertError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::ValidationError { .. } => ErrorCategory::Validation,
            ConvertError::StagingError { .. }
            | ConvertError::SpawnError { .. }
            | ConvertError::WaitError { .. }
            | ConvertError::IoError(_) => ErrorCategory::Environment,
            ConvertError::ConversionError { .. } => ErrorCategory::Content,
            ConvertError::ReadError { .. } => ErrorCategory::ConverterContract,
            ConvertError::TimeoutError { .. } => ErrorCategory::Timeout,
            ConvertError::ConfigValidationError { .. }
            | ConvertError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// True for errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Short message safe to hand to an HTTP client. Never contains paths,
    /// exit codes or converter output.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ConvertError::ValidationError { message } => message.clone(),
            ConvertError::StagingError { .. } => "Failed to store the uploaded file".to_string(),
            ConvertError::SpawnError { .. } => "Converter could not be started".to_string(),
            ConvertError::WaitError { .. } => {
                "Conversion failed: the converter process was lost".to_string()
            }
            ConvertError::IoError(_) => "Internal I/O error".to_string(),
            ConvertError::ConversionError { .. } => {
                "Conversion failed: the converter rejected the file".to_string()
            }
            ConvertError::ReadError { .. } => {
                "Conversion failed: the converter produced no readable output".to_string()
            }
            ConvertError::TimeoutError { .. } => "Conversion timed out".to_string(),
            ConvertError::ConfigValidationError { .. }
            | ConvertError::InvalidConfigValueError { .. } => {
                "Service is misconfigured".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Upload a file with the .tlg extension",
            ErrorCategory::Environment => {
                "Check that the temp directory is writable and the converter executable exists"
            }
            ErrorCategory::Content => "Check that the uploaded trade log is well formed",
            ErrorCategory::ConverterContract => {
                "The converter must write CSV to its second argument before exiting 0"
            }
            ErrorCategory::Timeout => "Raise --timeout-secs or investigate the converter",
            ErrorCategory::Configuration => "Fix the reported setting and restart",
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_converter_details() {
        let err = ConvertError::ConversionError {
            exit_code: Some(2),
            stderr: "Traceback: /tmp/tlg-convert/secret_path.tlg".to_string(),
        };
        let message = err.user_friendly_message();
        assert!(!message.contains("/tmp"));
        assert!(!message.contains('2'));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_categories() {
        assert!(ConvertError::validation("No file uploaded").is_client_error());
        assert_eq!(
            ConvertError::TimeoutError {
                after: Duration::from_secs(1)
            }
            .category(),
            ErrorCategory::Timeout
        );
        let read = ConvertError::ReadError {
            path: PathBuf::from("out.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(read.category(), ErrorCategory::ConverterContract);
        assert!(!read.is_client_error());
    }

    #[test]
    fn test_wait_failure_is_not_reported_as_staging() {
        let wait = ConvertError::WaitError {
            program: "python3".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::Interrupted),
        };
        let staging = ConvertError::StagingError {
            path: PathBuf::from("in.tlg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(wait.category(), ErrorCategory::Environment);
        assert_ne!(wait.user_friendly_message(), staging.user_friendly_message());
        assert!(!wait.user_friendly_message().contains("python3"));
        assert!(wait.to_string().contains("python3"));
    }

    #[test]
    fn test_signal_exit_description() {
        let err = ConvertError::ConversionError {
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
