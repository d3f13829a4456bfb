//! # sessiongate
//!
//! Session and authentication core for the storefront web app.
//!
//! The server half (`routes`, `services`) issues and clears the httpOnly
//! `token` cookie and guards page navigation on its presence. The client half
//! (`client`) is the single outbound API gateway plus the non-authoritative
//! session store that drives UI state.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
