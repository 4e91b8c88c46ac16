//! Error types for sign-in and sessions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    /// The provider exists but has no client credentials.
    #[error("provider '{0}' is not configured")]
    NotConfigured(String),

    /// The callback's state does not belong to a pending sign-in.
    #[error("invalid or expired sign-in state")]
    InvalidState,

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("profile request failed: {0}")]
    Profile(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl AuthError {
    /// Whether the failure came from talking to the provider.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AuthError::Exchange(_) | AuthError::Profile(_))
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
