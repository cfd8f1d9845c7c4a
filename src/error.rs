//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Chart definition is not valid: {0}")]
    ChartParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Remote { .. } => "REMOTE_ERROR",
            AppError::EmptyResponse(_) => "EMPTY_RESPONSE",
            AppError::ChartParse(_) => "CHART_PARSE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The call reached the server but produced nothing usable
    pub fn is_empty_response(&self) -> bool {
        matches!(self, AppError::EmptyResponse(_))
    }
}

/// Serializable error response for the CLI's JSON output
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        ErrorResponse::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_codes() {
        let resp = ErrorResponse::from(AppError::EmptyResponse("chart/gen".to_string()));
        assert_eq!(resp.code, "EMPTY_RESPONSE");
        assert_eq!(resp.message, "Empty response from chart/gen");

        let resp = ErrorResponse::from(AppError::Remote {
            code: 40100,
            message: "not logged in".to_string(),
        });
        assert_eq!(resp.code, "REMOTE_ERROR");
        assert!(resp.message.contains("not logged in"));
    }

    #[test]
    fn test_serialization_error_converts() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
        assert!(!err.is_empty_response());
    }
}
