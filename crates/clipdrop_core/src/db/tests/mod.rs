//! Database integration tests.

use super::*;
use crate::error::AppError;
use crate::models::item::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn request(content: &str) -> CreateItemRequest {
    CreateItemRequest {
        content: content.to_string(),
        password: None,
        expires_at: None,
    }
}
