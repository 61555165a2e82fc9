//! Core storage engine for ClipDrop (config, keys, expiry, storage, retrieval).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across ClipDrop crates.
pub mod constants;
/// Database access layer for clipboard items.
pub mod db;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Expiry policy shared by lazy and active expiry.
pub mod expiry;
/// Short human-friendly key generation and normalization.
pub mod keygen;
/// Data models for API requests and stored items.
pub mod models;
/// Password-gated retrieval on top of the item store.
pub mod retrieval;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::AppError;
pub use retrieval::{Retrieval, RetrievalGate};
