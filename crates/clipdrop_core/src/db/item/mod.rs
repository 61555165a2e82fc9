//! Item storage operations backed by redb.
//!
//! Every mutation is a single redb write transaction. redb admits one writer
//! at a time, so a read-modify-write such as [`ItemDb::increment_view`] can
//! never lose an update, and create's collision check and insert commit
//! together.

mod helpers;

use crate::constants::MAX_KEY_ATTEMPTS;
use crate::db::tables::{ITEMS, ITEMS_BY_EXPIRY};
use crate::error::AppError;
use crate::keygen::{generate_key, normalize_key};
use crate::models::item::{normalize_password, validate_content, CreateItemRequest, Item};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};
use std::sync::Arc;

pub(crate) use self::helpers::StoredItem;
use self::helpers::{deserialize_item, expiry_millis, sweep_upper_bound};

/// Accessor for item tables.
pub struct ItemDb {
    db: Arc<redb::Database>,
}

impl ItemDb {
    /// Initialize item tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ITEMS)?;
        write_txn.open_table(ITEMS_BY_EXPIRY)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Create an item and return its key.
    ///
    /// # Arguments
    /// - `req`: Content, optional password, optional expiry.
    /// - `now`: Creation time; also the reference for expiry validation.
    ///
    /// # Returns
    /// The generated key, in the case it was generated.
    ///
    /// # Errors
    /// [`AppError::ContentInvalid`], [`AppError::ExpiryNotFuture`],
    /// [`AppError::ExpiryTooFar`], [`AppError::KeyExhausted`], or a storage
    /// error.
    pub fn create(&self, req: CreateItemRequest, now: DateTime<Utc>) -> Result<String, AppError> {
        self.create_with_keys(req, now, generate_key)
    }

    /// [`ItemDb::create`] with an explicit key source.
    pub(crate) fn create_with_keys<F>(
        &self,
        req: CreateItemRequest,
        now: DateTime<Utc>,
        mut next_key: F,
    ) -> Result<String, AppError>
    where
        F: FnMut() -> String,
    {
        validate_content(&req.content)?;
        let expires_at = crate::expiry::resolve(req.expires_at, now)?;

        let mut item = StoredItem {
            key: String::new(),
            content: req.content,
            password: normalize_password(req.password),
            view_count: 0,
            created_at: now,
            expires_at: Some(expires_at),
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut items = write_txn.open_table(ITEMS)?;
            let mut by_expiry = write_txn.open_table(ITEMS_BY_EXPIRY)?;

            let mut attempts = 0;
            let normalized = loop {
                if attempts == MAX_KEY_ATTEMPTS {
                    tracing::error!(attempts, "Key space exhausted for new item");
                    return Err(AppError::KeyExhausted { attempts });
                }
                attempts += 1;

                let candidate = next_key();
                let normalized = normalize_key(&candidate);
                let existing = match items.get(normalized.as_str())? {
                    Some(guard) => Some(deserialize_item(guard.value())?),
                    None => None,
                };
                match existing {
                    Some(previous) if previous.is_live(now) => {
                        tracing::debug!(attempt = attempts, "Generated key collided with a live item");
                        continue;
                    }
                    Some(previous) => {
                        // Expired but not yet swept: the key is free again.
                        if let Some(at) = previous.expires_at {
                            by_expiry.remove((expiry_millis(at), normalized.as_str()))?;
                        }
                    }
                    None => {}
                }
                item.key = candidate;
                break normalized;
            };

            let encoded = bincode::serialize(&item)?;
            items.insert(normalized.as_str(), encoded.as_slice())?;
            by_expiry.insert((expiry_millis(expires_at), normalized.as_str()), ())?;
        }
        write_txn.commit()?;

        tracing::debug!(key = %item.key, expires_at = %expires_at, "Created item");
        Ok(item.key)
    }

    /// Fetch a live item by key (case-insensitive).
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the key is absent or expired, otherwise a
    /// storage or deserialization error.
    pub fn fetch(&self, key: &str, now: DateTime<Utc>) -> Result<Item, AppError> {
        let normalized = normalize_key(key);
        let read_txn = self.db.begin_read()?;
        let items = read_txn.open_table(ITEMS)?;
        let Some(guard) = items.get(normalized.as_str())? else {
            return Err(AppError::NotFound);
        };
        let stored = deserialize_item(guard.value())?;
        if !stored.is_live(now) {
            return Err(AppError::NotFound);
        }
        Ok(stored.into())
    }

    /// Whether a live item exists under `key` and requires a password.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn has_password(&self, key: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        match self.fetch(key, now) {
            Ok(item) => Ok(item.has_password()),
            Err(AppError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Atomically add one view to a live item.
    ///
    /// # Returns
    /// `Ok(Some(count))` with the post-increment count, or `Ok(None)` when the
    /// item is absent or expired (nothing is written).
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn increment_view(&self, key: &str, now: DateTime<Utc>) -> Result<Option<u64>, AppError> {
        let normalized = normalize_key(key);
        let write_txn = self.db.begin_write()?;
        let view_count = {
            let mut items = write_txn.open_table(ITEMS)?;
            let mut stored = match items.get(normalized.as_str())? {
                Some(guard) => deserialize_item(guard.value())?,
                None => return Ok(None),
            };
            if !stored.is_live(now) {
                return Ok(None);
            }
            stored.view_count = stored.view_count.saturating_add(1);
            let encoded = bincode::serialize(&stored)?;
            items.insert(normalized.as_str(), encoded.as_slice())?;
            stored.view_count
        };
        write_txn.commit()?;
        Ok(Some(view_count))
    }

    /// Present a live item to `gate` and count one view when it admits the
    /// read.
    ///
    /// The lookup, `gate`, and the increment share one write transaction, so
    /// the counted row is the row `gate` inspected.
    ///
    /// # Returns
    /// `Ok(None)` when the item is absent or expired. Otherwise
    /// `Some(Ok((value, count)))` with the post-increment count when `gate`
    /// returns `Ok(value)`, or `Some(Err(outcome))` with nothing written.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn view_if<T, R, F>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        gate: F,
    ) -> Result<Option<Result<(T, u64), R>>, AppError>
    where
        F: FnOnce(&Item) -> Result<T, R>,
    {
        let normalized = normalize_key(key);
        let write_txn = self.db.begin_write()?;
        let viewed = {
            let mut items = write_txn.open_table(ITEMS)?;
            let mut stored = match items.get(normalized.as_str())? {
                Some(guard) => deserialize_item(guard.value())?,
                None => return Ok(None),
            };
            if !stored.is_live(now) {
                return Ok(None);
            }
            let admitted = match gate(&Item::from(stored.clone())) {
                Ok(value) => value,
                Err(outcome) => return Ok(Some(Err(outcome))),
            };
            stored.view_count = stored.view_count.saturating_add(1);
            let encoded = bincode::serialize(&stored)?;
            items.insert(normalized.as_str(), encoded.as_slice())?;
            (admitted, stored.view_count)
        };
        write_txn.commit()?;
        Ok(Some(Ok(viewed)))
    }

    /// Delete an item by key, live or expired.
    ///
    /// # Returns
    /// `true` when a row was removed, `false` when there was nothing to remove.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, key: &str) -> Result<bool, AppError> {
        let normalized = normalize_key(key);
        let write_txn = self.db.begin_write()?;
        {
            let mut items = write_txn.open_table(ITEMS)?;
            let mut by_expiry = write_txn.open_table(ITEMS_BY_EXPIRY)?;

            let removed = match items.remove(normalized.as_str())? {
                Some(guard) => deserialize_item(guard.value())?,
                None => return Ok(false),
            };
            if let Some(at) = removed.expires_at {
                by_expiry.remove((expiry_millis(at), normalized.as_str()))?;
            }
        }
        write_txn.commit()?;
        tracing::debug!(key = %normalized, "Deleted item");
        Ok(true)
    }

    /// Physically remove every item whose expiry is at or before `now`.
    ///
    /// Candidates come from the expiry index; each is re-checked with the
    /// shared liveness predicate before removal.
    ///
    /// # Returns
    /// Number of items removed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut items = write_txn.open_table(ITEMS)?;
            let mut by_expiry = write_txn.open_table(ITEMS_BY_EXPIRY)?;

            let mut candidates: Vec<(u64, String)> = Vec::new();
            for entry in by_expiry.range(..(sweep_upper_bound(now), ""))? {
                let (index_key, _) = entry?;
                let (millis, key) = index_key.value();
                candidates.push((millis, key.to_string()));
            }

            let mut removed = 0usize;
            for (millis, key) in candidates {
                let stored = match items.get(key.as_str())? {
                    Some(guard) => Some(deserialize_item(guard.value())?),
                    None => None,
                };
                match stored {
                    Some(stored) if stored.is_live(now) => continue,
                    Some(_) => {
                        items.remove(key.as_str())?;
                        removed += 1;
                    }
                    None => {
                        tracing::warn!(key = %key, "Dropping expiry index entry without an item row");
                    }
                }
                by_expiry.remove((millis, key.as_str()))?;
            }
            removed
        };
        write_txn.commit()?;

        if removed > 0 {
            tracing::debug!(removed, "Swept expired items");
        }
        Ok(removed)
    }

    /// Count stored rows, including expired ones not yet swept.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn len(&self) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let items = read_txn.open_table(ITEMS)?;
        Ok(items.len()?)
    }

    /// Whether the store holds no rows at all.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}
