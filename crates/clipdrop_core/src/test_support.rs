//! Shared test-only helpers for clipdrop_core.

use crate::models::item::CreateItemRequest;
use crate::Database;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// A fixed clock reading so expiry arithmetic is reproducible.
pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Stores `content` with an optional password and the default expiry.
///
/// # Panics
/// Panics if the create fails.
pub(crate) fn store(db: &Database, content: &str, password: Option<&str>) -> String {
    db.items
        .create(
            CreateItemRequest {
                content: content.to_string(),
                password: password.map(str::to_string),
                expires_at: None,
            },
            fixed_now(),
        )
        .expect("create item")
}
