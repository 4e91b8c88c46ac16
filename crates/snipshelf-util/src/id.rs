//! ULID-based identifier generation with prefixes.
//!
//! Identifiers follow the pattern `prefix_ulid`, e.g. `snp_01j9...` for a
//! snippet. Records created from seed data keep their short literal ids, so
//! callers must not assume every id parses.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Snippet,
    Config,
    Session,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Snippet => "snp",
            IdPrefix::Config => "cfg",
            IdPrefix::Session => "ses",
        }
    }
}

/// Identifier generation.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    pub fn ascending(prefix: IdPrefix) -> String {
        Self::with_ulid(prefix, Ulid::new())
    }

    /// Generate an identifier with a specific ULID (for testing or imports).
    pub fn with_ulid(prefix: IdPrefix, ulid: Ulid) -> String {
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    pub fn snippet() -> String {
        Self::ascending(IdPrefix::Snippet)
    }

    pub fn config() -> String {
        Self::ascending(IdPrefix::Config)
    }

    pub fn session() -> String {
        Self::ascending(IdPrefix::Session)
    }
}
