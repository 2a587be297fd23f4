// src/errors.rs

use thiserror::Error;

/// Errors raised by the advisor client.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("API error: {0}")]
    Api(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

impl AdvisorError {
    pub fn api_error(msg: impl Into<String>) -> Self {
        AdvisorError::Api(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        AdvisorError::Config(msg.into())
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        AdvisorError::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AdvisorError::api_error("boom").to_string(),
            "API error: boom"
        );
        assert_eq!(
            AdvisorError::config_error("missing base url").to_string(),
            "config error: missing base url"
        );
        let err = AdvisorError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned status 502: bad gateway");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AdvisorError = io.into();
        assert!(matches!(err, AdvisorError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }
}
