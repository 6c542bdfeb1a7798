//! # tooxoot_core
//!
//! Authentication core for tooxoot: signed identity tokens, bcrypt
//! credentials and the document-store gateway that persists them.

pub mod auth;
pub mod clock;
pub mod config;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
