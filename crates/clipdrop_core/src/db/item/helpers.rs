//! Row encoding and index helpers shared by item storage operations.

use crate::models::item::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted item row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredItem {
    /// Key as generated (display case).
    pub key: String,
    pub content: String,
    pub password: Option<String>,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredItem {
    pub(crate) fn is_live(&self, now: DateTime<Utc>) -> bool {
        crate::expiry::is_live(self.expires_at, now)
    }
}

impl From<StoredItem> for Item {
    fn from(value: StoredItem) -> Self {
        Item::from_parts(
            value.key,
            value.content,
            value.password,
            value.view_count,
            value.created_at,
            value.expires_at,
        )
    }
}

pub(crate) fn deserialize_item(bytes: &[u8]) -> Result<StoredItem, bincode::Error> {
    bincode::deserialize(bytes)
}

/// Expiry index component for a timestamp.
///
/// Pre-epoch timestamps clamp to zero so they sort first instead of
/// underflowing.
pub(crate) fn expiry_millis(at: DateTime<Utc>) -> u64 {
    at.timestamp_millis().max(0) as u64
}

/// Exclusive upper bound of the expiry index range that may hold rows
/// expired at `now`.
///
/// The index is millisecond-granular, so the range over-selects rows expiring
/// later within the same millisecond; callers re-check with the liveness
/// predicate.
pub(crate) fn sweep_upper_bound(now: DateTime<Utc>) -> u64 {
    expiry_millis(now).saturating_add(1)
}
