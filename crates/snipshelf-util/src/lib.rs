//! Shared utilities for snipshelf.
//!
//! - Error kind type used for parse and validation failures
//! - Prefixed ULID identifiers for snippets, configs and sessions
//! - Logging setup with tracing

pub mod error;
pub mod id;
pub mod log;

pub use error::{Error, ErrorKind, Result};
pub use id::{IdPrefix, Identifier};
