use crate::utils::error::{ConvertError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    if origin.is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin cannot be empty".to_string(),
        });
    }

    if origin == "*" {
        return Ok(());
    }

    match Url::parse(origin) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(()),
            "http" | "https" => Err(ConvertError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: origin.to_string(),
                reason: "Origin has no host".to_string(),
            }),
            scheme => Err(ConvertError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: origin.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
