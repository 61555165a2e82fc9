//! Shared constants used across ClipDrop crates.

/// Default API port for ClipDrop.
pub const DEFAULT_PORT: u16 = 38420;

/// Maximum item content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Request body ceiling for the HTTP layer.
///
/// Sized for [`MAX_CONTENT_CHARS`] worst-case UTF-8 plus JSON escaping.
pub const MAX_REQUEST_BODY_BYTES: usize = 128 * 1024;

/// Lifetime applied when a create request carries no expiry.
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Furthest an explicit expiry may lie beyond creation time.
pub const MAX_TTL_DAYS: i64 = 30;

/// Key alphabet with visually ambiguous characters removed.
pub const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
/// Shortest generated key length.
pub const KEY_MIN_LEN: usize = 2;
/// Longest generated key length.
pub const KEY_MAX_LEN: usize = 6;
/// Candidate keys tried by a single create before giving up.
pub const MAX_KEY_ATTEMPTS: usize = 16;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
/// Default bound on a single storage call made from the HTTP layer.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38420";

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";
