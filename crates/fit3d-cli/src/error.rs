use thiserror::Error;

/// Main error type for fit3d-cli
#[derive(Error, Debug)]
pub enum Fit3dError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("No token found. Please run 'fit3d auth login' first.")]
    NotAuthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Scans unavailable")]
    ScansUnavailable,

    #[error("Scan format not readable")]
    ScanFormat,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Fit3dError>;

impl Fit3dError {
    /// Create an authentication error from a message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a store error from a message
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an invalid parameter error from a message
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Fit3dError::Authentication("Invalid credentials".to_string());
        assert_eq!(err.to_string(), "Authentication error: Invalid credentials");
    }

    #[test]
    fn test_not_authenticated_error() {
        let err = Fit3dError::NotAuthenticated;
        assert!(err.to_string().contains("fit3d auth login"));
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(Fit3dError::TokenExpired.to_string(), "Token expired");
        assert_eq!(Fit3dError::ScansUnavailable.to_string(), "Scans unavailable");
        assert_eq!(Fit3dError::ScanFormat.to_string(), "Scan format not readable");
    }

    #[test]
    fn test_error_constructors() {
        let auth_err = Fit3dError::auth("test auth");
        assert!(matches!(auth_err, Fit3dError::Authentication(_)));

        let config_err = Fit3dError::config("test config");
        assert!(matches!(config_err, Fit3dError::Config(_)));

        let store_err = Fit3dError::store("test store");
        assert!(matches!(store_err, Fit3dError::Store(_)));

        let param_err = Fit3dError::invalid_param("bad param");
        assert!(matches!(param_err, Fit3dError::InvalidParameter(_)));
    }
}
