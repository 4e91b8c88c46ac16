//! Error types for the core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] snipshelf_storage::StorageError),

    /// Rejected user input (unknown tool, empty title, ...).
    #[error("{0}")]
    Invalid(#[from] snipshelf_util::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether the same save could succeed if the caller tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Storage(e) => e.is_transient(),
            CoreError::Io(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    #[error("environment variable not found: {name}")]
    EnvVarNotFound { name: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use snipshelf_storage::StorageError;

    #[test]
    fn test_not_found_message() {
        let err = CoreError::NotFound {
            kind: "snippet",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "snippet not found: 42");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_storage_io_failure_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = CoreError::from(StorageError::from(io));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let err = CoreError::from(snipshelf_util::Error::missing_field("name"));
        assert_eq!(err.to_string(), "name is required");
        assert!(!err.is_retryable());
    }
}
