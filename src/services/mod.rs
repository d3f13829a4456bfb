//! Server-side services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! `identity` forwards calls to the upstream identity backend; `session` owns
//! the `token` cookie. Route handlers stay focused on validation and protocol
//! translation.

pub mod identity;
pub mod session;
