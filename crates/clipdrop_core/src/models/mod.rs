//! Data models for API requests and stored items.

/// Clipboard item model and request payloads.
pub mod item;
