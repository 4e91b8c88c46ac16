//! Error type for parsing and validating user-supplied values.
//!
//! Library crates wrap this in their own `thiserror` enums.

use std::fmt;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while interpreting user input or local data.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value outside of a closed set (tool, language, theme, provider)
    InvalidInput,
    /// A required field was empty
    MissingField,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// A value that is not one of the accepted variants.
    ///
    /// The message lists what would have been accepted.
    pub fn unknown_variant(what: &str, value: &str, accepted: &[&str]) -> Self {
        Self::new(
            ErrorKind::InvalidInput,
            format!(
                "unknown {what} '{value}' (expected one of: {})",
                accepted.join(", ")
            ),
        )
    }

    /// A required field that was left empty.
    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorKind::MissingField, format!("{field} is required"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
