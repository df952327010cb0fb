//! Validation errors shared by mappers, converters and entity schemas.

/// Malformed input to a mapper, converter or repository `create`/`update`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as the caller sent it
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Required field was absent
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "field is required")
    }
}

/// Rejects empty or whitespace-only text.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    Ok(())
}

/// Applies [`require_non_empty`] only when a patch provides the field.
pub fn require_non_empty_opt(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_non_empty(field, v),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_field() {
        let err = ValidationError::new("locationCoords", "latitude is not a number");
        assert_eq!(
            err.to_string(),
            "Invalid locationCoords: latitude is not a number"
        );
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("label", "Home").is_ok());
        assert!(require_non_empty("label", "").is_err());
        assert!(require_non_empty("label", "   ").is_err());
    }

    #[test]
    fn test_require_non_empty_opt_skips_absent_fields() {
        assert!(require_non_empty_opt("label", None).is_ok());
        assert!(require_non_empty_opt("label", Some(" ")).is_err());
    }
}
