//! The single access rule: no session, no dashboard.

/// Outcome of checking one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Send the browser to this location with a 302.
    Redirect(String),
}

/// Decides which requests need a signed-in session.
#[derive(Debug, Clone)]
pub struct AccessGate {
    signin_path: String,
    disabled: bool,
}

impl AccessGate {
    pub fn new(signin_path: impl Into<String>) -> Self {
        Self {
            signin_path: signin_path.into(),
            disabled: false,
        }
    }

    /// A gate that lets everything through.
    pub fn disabled(signin_path: impl Into<String>) -> Self {
        Self {
            signin_path: signin_path.into(),
            disabled: true,
        }
    }

    pub fn signin_path(&self) -> &str {
        &self.signin_path
    }

    /// Paths reachable without a session: the landing page, health, the
    /// sign-in page and everything under it, and the `/auth/` endpoints the
    /// sign-in flow itself needs.
    pub fn is_exempt(&self, path: &str) -> bool {
        path == "/"
            || path == "/health"
            || under(path, &self.signin_path)
            || under(path, "/auth/callback")
            || path == "/auth/session"
            || path == "/auth/signout"
    }

    pub fn check(&self, path: &str, has_session: bool) -> GateDecision {
        if self.disabled || has_session || self.is_exempt(path) {
            GateDecision::Allow
        } else {
            GateDecision::Redirect(self.signin_path.clone())
        }
    }
}

/// `path` is `prefix` itself or a sub-path of it.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
