//! Core types and state machines for the Recipe Vault.
//!
//! This crate holds the record model, the submission validator, the
//! geolocation acquisition protocol and the tick-driven workflow. Storage,
//! HTTP and sensor access are reached through the traits defined here; the
//! concrete backends live in `vault-store-csv` and `vault-cli`.

pub mod auth;
pub mod chat;
pub mod error;
pub mod geo;
pub mod recipe;
pub mod report;
pub mod session;
pub mod store;
pub mod validate;
pub mod workflow;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod testing;
