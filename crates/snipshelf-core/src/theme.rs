//! Process-wide light/dark theme.
//!
//! One [`ThemeState`] is created at startup and handed to whoever renders
//! code. Consumers that need to react to changes hold a [`ThemeSubscription`];
//! dropping it is the unsubscribe.

use serde::{Deserialize, Serialize};
use snipshelf_util::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    /// `system` has no OS to ask on a server and resolves to light.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "system" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(Error::unknown_variant("theme", s, &["light", "dark", "system"])),
        }
    }
}

/// Shared handle to the current theme. Clones point at the same state.
#[derive(Debug, Clone)]
pub struct ThemeState {
    tx: Arc<watch::Sender<ThemeMode>>,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl ThemeState {
    pub fn new(mode: ThemeMode) -> Self {
        let (tx, _) = watch::channel(mode);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> ThemeMode {
        *self.tx.borrow()
    }

    /// Set the theme. Returns the previous mode.
    pub fn set(&self, mode: ThemeMode) -> ThemeMode {
        let previous = self.tx.send_replace(mode);
        if previous != mode {
            debug!(from = %previous, to = %mode, "Theme changed");
        }
        previous
    }

    pub fn subscribe(&self) -> ThemeSubscription {
        ThemeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live view of the theme. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ThemeSubscription {
    rx: watch::Receiver<ThemeMode>,
}

impl ThemeSubscription {
    pub fn current(&self) -> ThemeMode {
        *self.rx.borrow()
    }

    /// Wait for the next change. Returns `None` once the state is gone.
    pub async fn changed(&mut self) -> Option<ThemeMode> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("Dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert_eq!("system".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert!("sepia".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn test_set_is_visible_through_clones() {
        let state = ThemeState::new(ThemeMode::Light);
        let handle = state.clone();
        assert_eq!(handle.set(ThemeMode::Dark), ThemeMode::Light);
        assert_eq!(state.current(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_subscriber_sees_change() {
        let state = ThemeState::default();
        let mut sub = state.subscribe();
        assert_eq!(sub.current(), ThemeMode::Light);

        state.set(ThemeMode::Dark);
        assert_eq!(sub.changed().await, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let state = ThemeState::default();
        let a = state.subscribe();
        let b = state.subscribe();
        assert_eq!(state.subscriber_count(), 2);

        drop(a);
        assert_eq!(state.subscriber_count(), 1);
        drop(b);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_changed_ends_when_state_dropped() {
        let state = ThemeState::default();
        let mut sub = state.subscribe();
        drop(state);
        assert_eq!(sub.changed().await, None);
    }
}
