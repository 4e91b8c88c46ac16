//! Core logic for snipshelf.
//!
//! Holds the two record types (snippets and tool configs), the search filter
//! used by the list views, the tool-dependent defaulting used by the config
//! editor, the repository the server stores records through, and the shared
//! theme state consumed by the code preview.

pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod form;
pub mod highlight;
pub mod model;
pub mod repository;
pub mod seed;
pub mod theme;

pub use defaults::{derive_defaults, Overrides, ToolDefaults};
pub use error::{ConfigError, CoreError, CoreResult};
pub use filter::{filter, search, FieldAccessor, Searchable};
pub use form::{ConfigDraft, ConfigForm, FieldOrigin, SnippetDraft, SnippetForm};
pub use model::{ConfigLanguage, Snippet, ToolConfig, ToolKind};
pub use repository::{Record, Repository, StoreRepository};
pub use theme::{ThemeMode, ThemeState, ThemeSubscription};
