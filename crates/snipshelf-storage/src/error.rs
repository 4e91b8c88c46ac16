//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Bad keys and undecodable records fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::LockPoisoned(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_formats_message() {
        let err = StorageError::invalid_key("empty key component");
        assert_eq!(err.to_string(), "Invalid key: empty key component");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_io_errors_are_transient() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::from(io_err);
        assert!(err.to_string().contains("IO error"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_json_errors_are_not_transient() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        assert!(!StorageError::from(json_err).is_transient());
    }
}
