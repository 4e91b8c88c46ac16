//! Server state.

use snipshelf_auth::{AccessGate, IdentityProvider, SessionStore};
use snipshelf_core::config::{DEFAULT_CALLBACK_URL, DEFAULT_SIGNIN_PATH};
use snipshelf_core::{Repository, Snippet, StoreRepository, ThemeState, ToolConfig};
use snipshelf_storage::MemoryStorage;
use std::sync::Arc;

/// Shared state for all handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub snippets: Arc<dyn Repository<Snippet>>,
    pub configs: Arc<dyn Repository<ToolConfig>>,
    pub theme: ThemeState,
    pub sessions: SessionStore,
    pub identity: Arc<dyn IdentityProvider>,
    pub gate: AccessGate,
    /// Public origin used to build OAuth redirect URIs.
    pub base_url: String,
    /// Landing page after sign-in when none was requested.
    pub callback_url: String,
}

impl AppState {
    pub fn new(
        snippets: Arc<dyn Repository<Snippet>>,
        configs: Arc<dyn Repository<ToolConfig>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            snippets,
            configs,
            theme: ThemeState::default(),
            sessions: SessionStore::default(),
            identity,
            gate: AccessGate::new(DEFAULT_SIGNIN_PATH),
            base_url: "http://127.0.0.1:3000".to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
        }
    }

    /// Empty in-memory repositories.
    pub fn in_memory(identity: Arc<dyn IdentityProvider>) -> Self {
        Self::new(
            Arc::new(StoreRepository::<Snippet, _>::new(MemoryStorage::new())),
            Arc::new(StoreRepository::<ToolConfig, _>::new(MemoryStorage::new())),
            identity,
        )
    }

    pub fn with_theme(mut self, theme: ThemeState) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = callback_url.into();
        self
    }

    pub fn redirect_uri(&self, provider: &str) -> String {
        format!("{}/auth/callback/{}", self.base_url, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipshelf_auth::{StaticIdentity, User};

    #[test]
    fn test_redirect_uri_strips_trailing_slash() {
        let state = AppState::in_memory(Arc::new(StaticIdentity::new(User::default())))
            .with_base_url("https://snips.example.com/");
        assert_eq!(
            state.redirect_uri("github"),
            "https://snips.example.com/auth/callback/github"
        );
    }

    #[tokio::test]
    async fn test_clones_share_repositories() {
        let state = AppState::in_memory(Arc::new(StaticIdentity::new(User::default())));
        let clone = state.clone();
        for snippet in snipshelf_core::seed::snippets() {
            state.snippets.create(snippet).await.unwrap();
        }
        assert_eq!(clone.snippets.list().await.unwrap().len(), 4);
    }
}
