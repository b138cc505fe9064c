//! Error handling for the calculation engine

/// Engine error type
///
/// Every variant is recoverable at the call site. Unknown enum values never
/// produce an error; they resolve to the documented fallback coefficients.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String, errors: Vec<String> },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>, errors: Vec<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
            errors,
        }
    }

    /// Short machine-readable tag, used in JSON error output
    pub fn error_type(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "invalid_input",
            EngineError::Configuration { .. } => "configuration",
            EngineError::Json(_) => "malformed_json",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::invalid_input("investment", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid input for 'investment': must be positive"
        );
        assert_eq!(err.error_type(), "invalid_input");

        let err = EngineError::configuration("bad catalog", vec!["audit: min > max".to_string()]);
        assert!(err.to_string().contains("bad catalog"));
        assert_eq!(err.error_type(), "configuration");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: EngineError = parse.unwrap_err().into();
        assert_eq!(err.error_type(), "malformed_json");
    }
}
