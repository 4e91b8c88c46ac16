//! Sign-in for snipshelf.
//!
//! Google and GitHub sign-in over OAuth, an in-process session store, and
//! the access gate that keeps the dashboard behind a session.

pub mod error;
pub mod gate;
pub mod provider;
pub mod session;

pub use error::{AuthError, AuthResult};
pub use gate::{AccessGate, GateDecision};
pub use provider::{ClientCredentials, IdentityProvider, OAuthClient, Provider, StaticIdentity};
pub use session::{PendingSignIn, Session, SessionStore, User, SESSION_COOKIE};
