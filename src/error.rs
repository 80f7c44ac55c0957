//! Error types for the Telegram sender

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Session file not found: {0}")]
    SessionNotFound(String),

    #[error("Session is locked by another process")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authorization required")]
    AuthorizationRequired,

    #[error("Could not resolve '{target}': {reason}")]
    ResolutionFailed { target: String, reason: String },

    #[error("Delivery to '{target}' failed: {reason}")]
    DeliveryFailed { target: String, reason: String },

    #[error("Nothing to send: {0}")]
    EmptyInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_session_not_found() {
        let err = Error::SessionNotFound("test.session".to_string());
        assert!(err.to_string().contains("Session file not found"));
        assert!(err.to_string().contains("test.session"));
    }

    #[test]
    fn test_error_display_session_locked() {
        let err = Error::SessionLocked;
        assert!(err.to_string().contains("locked by another process"));
    }

    #[test]
    fn test_error_display_resolution_failed() {
        let err = Error::ResolutionFailed {
            target: "@missing".to_string(),
            reason: "username not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("@missing"));
        assert!(msg.contains("username not found"));
    }

    #[test]
    fn test_error_display_delivery_failed() {
        let err = Error::DeliveryFailed {
            target: "rust_chat".to_string(),
            reason: "CHAT_WRITE_FORBIDDEN".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Delivery to 'rust_chat' failed"));
        assert!(msg.contains("CHAT_WRITE_FORBIDDEN"));
    }

    #[test]
    fn test_error_display_empty_input() {
        let err = Error::EmptyInput("group list is empty".to_string());
        assert_eq!(err.to_string(), "Nothing to send: group list is empty");
    }

    #[test]
    fn test_error_display_connection_error() {
        let err = Error::ConnectionError("timeout".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Connection error"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_error_display_authorization_required() {
        let err = Error::AuthorizationRequired;
        assert!(err.to_string().contains("Authorization required"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_from_serde_yaml() {
        let yaml_err = serde_yaml::from_str::<Vec<i32>>("{ invalid yaml [").unwrap_err();
        let err: Error = yaml_err.into();

        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_all_variants_debug() {
        let variants: Vec<Error> = vec![
            Error::SessionNotFound("session".to_string()),
            Error::SessionLocked,
            Error::LockError("lock".to_string()),
            Error::TelegramError("telegram".to_string()),
            Error::ConnectionError("conn".to_string()),
            Error::AuthorizationRequired,
            Error::EmptyInput("groups".to_string()),
            Error::Config("cfg".to_string()),
            Error::InvalidArgument("arg".to_string()),
        ];

        for err in variants {
            let debug_str = format!("{:?}", err);
            assert!(!debug_str.is_empty());
        }
    }
}
