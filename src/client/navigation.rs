//! Auth-failure events and the navigation controller that reacts to them.
//!
//! The gateway only announces that a session is gone. Navigation is the
//! controller's job: it clears the cached session and performs a hard
//! redirect to the login route.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::state::SessionStore;
use crate::routes::guard::LOGIN_PATH;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A call came back 401: the session cookie is missing or expired.
    Unauthorized,
}

/// Broadcast channel for [`AuthEvent`]s. Clones share the channel.
#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // No subscribers is fine: nobody is navigating.
        let _ = self.tx.send(event);
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Performs a full page navigation.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Spawn the top-level controller. Runs until every `AuthEvents` clone
/// (including the gateway's) is dropped.
#[must_use]
pub fn spawn_navigation_controller(
    events: &AuthEvents,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AuthEvent::Unauthorized) => {
                    tracing::info!(target = LOGIN_PATH, "session rejected, redirecting to login");
                    store.logout();
                    navigator.navigate(LOGIN_PATH);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth events lagged, redirecting to login");
                    store.logout();
                    navigator.navigate(LOGIN_PATH);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
