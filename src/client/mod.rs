//! Browser-side session plumbing.
//!
//! DESIGN
//! ======
//! `api` is the single outbound gateway; it never navigates on its own and
//! instead emits [`navigation::AuthEvent`]s that a top-level navigation
//! controller consumes. `state` is the UI-facing session cache, which is
//! never authoritative: the `token` cookie is. `flows` holds the form-level
//! orchestration that updates the cache after a confirmed backend outcome.

pub mod api;
pub mod flows;
pub mod navigation;
pub mod state;

pub use api::{ApiGateway, GatewayConfig, GatewayError};
pub use flows::FlowOutcome;
pub use navigation::{AuthEvent, AuthEvents, Navigator};
pub use state::{SessionRecord, SessionStore, SessionUser};
