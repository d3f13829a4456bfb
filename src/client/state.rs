#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Identity summary shown in the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Cached view of "who is logged in". Not authoritative; the cookie is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Observable session cache. Setters never validate; callers update it only
/// after a confirmed backend outcome. Clones share the same record.
#[derive(Clone, Debug)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionRecord>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionRecord::default());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionRecord {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionRecord> {
        self.tx.subscribe()
    }

    pub fn set_user(&self, user: Option<SessionUser>) {
        self.tx.send_modify(|record| record.user = user);
    }

    pub fn set_is_authenticated(&self, value: bool) {
        self.tx.send_modify(|record| record.is_authenticated = value);
    }

    pub fn set_is_loading(&self, value: bool) {
        self.tx.send_modify(|record| record.is_loading = value);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.tx.send_modify(|record| record.error = error);
    }

    /// Clear user, auth flag, and error. Loading is left as is.
    pub fn logout(&self) {
        self.tx.send_modify(|record| {
            record.user = None;
            record.is_authenticated = false;
            record.error = None;
        });
    }

    /// Back to the initial empty record.
    pub fn reset(&self) {
        self.tx.send_replace(SessionRecord::default());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
