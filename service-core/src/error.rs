use serde::Serialize;
use thiserror::Error;

/// Presentation class of an error. Views switch on this, not on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, shown inline next to the offending field.
    Validation,
    /// Missing, invalid or expired token. The view redirects to login.
    Authentication,
    /// Network failure or non-2xx response. Toast plus empty result.
    Transport,
    /// Single-resource lookup that came back empty.
    NotFound,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Structured field-level error payload returned by the API (HTTP 400).
    #[error("Field errors: {0}")]
    FieldErrors(serde_json::Value),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(anyhow::Error::new(err))
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::FieldErrors(_) => ErrorKind::Validation,
            AppError::Unauthorized(_) => ErrorKind::Authentication,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Api { .. }
            | AppError::Transport(_)
            | AppError::Decode(_)
            | AppError::Config(_) => ErrorKind::Transport,
        }
    }

    /// Short message suitable for a toast. Never leaks response bodies.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) | AppError::FieldErrors(_) => {
                "Please correct the highlighted fields.".to_string()
            }
            AppError::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            AppError::NotFound(_) => "The requested item could not be found.".to_string(),
            AppError::Api { status, .. } if *status >= 500 => {
                "The server ran into a problem. Please try again.".to_string()
            }
            AppError::Api { .. } => "The request could not be completed.".to_string(),
            AppError::Transport(_) | AppError::Decode(_) => {
                "Could not reach the server. Check your connection and retry.".to_string()
            }
            AppError::Config(_) => "The application is misconfigured.".to_string(),
        }
    }

    /// Classify an HTTP status and body into the matching variant.
    ///
    /// Callers only invoke this for non-2xx responses.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => AppError::Unauthorized(detail_or(body, "authentication required")),
            404 => AppError::NotFound(detail_or(body, "resource not found")),
            400 => match serde_json::from_str::<serde_json::Value>(body) {
                Ok(payload @ serde_json::Value::Object(_)) => AppError::FieldErrors(payload),
                _ => AppError::Api {
                    status,
                    message: body.to_string(),
                },
            },
            _ => AppError::Api {
                status,
                message: body.to_string(),
            },
        }
    }
}

/// Django REST framework puts its human-readable reason under `detail`.
fn detail_or(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            AppError::from_status(401, r#"{"detail":"Token expired"}"#).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(AppError::from_status(404, "").kind(), ErrorKind::NotFound);
        assert_eq!(AppError::from_status(500, "boom").kind(), ErrorKind::Transport);
        assert_eq!(
            AppError::from_status(400, r#"{"title":["This field is required."]}"#).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_bad_request_without_json_is_api_error() {
        match AppError::from_status(400, "nope") {
            AppError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_keeps_detail() {
        match AppError::from_status(401, r#"{"detail":"Token expired"}"#) {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
