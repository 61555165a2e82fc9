//! Application error types for core storage and domain logic.
use thiserror::Error;

/// Top-level application error type.
///
/// Password mismatches are not errors; see [`crate::Retrieval`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Empty or oversized content.
    #[error("Invalid content: {0}")]
    ContentInvalid(String),

    #[error("Expiry must be in the future")]
    ExpiryNotFuture,

    #[error("Expiry must be within {max_days} days")]
    ExpiryTooFar { max_days: i64 },

    /// Every candidate key collided with a live item.
    #[error("No free key found after {attempts} attempts")]
    KeyExhausted { attempts: usize },

    /// Absent or expired; the two are deliberately indistinguishable.
    #[error("Not found")]
    NotFound,

    /// Transient persistence failure (I/O, lock contention, timeout).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl AppError {
    /// Whether the caller made a correctable mistake.
    ///
    /// # Returns
    /// `true` for content and expiry validation failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ContentInvalid(_) | Self::ExpiryNotFuture | Self::ExpiryTooFar { .. }
        )
    }
}

impl From<redb::Error> for AppError {
    fn from(value: redb::Error) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn client_errors_cover_validation_failures_only() {
        assert!(AppError::ContentInvalid("empty".to_string()).is_client_error());
        assert!(AppError::ExpiryNotFuture.is_client_error());
        assert!(AppError::ExpiryTooFar { max_days: 30 }.is_client_error());
        assert!(!AppError::NotFound.is_client_error());
        assert!(!AppError::KeyExhausted { attempts: 16 }.is_client_error());
        assert!(!AppError::StorageUnavailable("io".to_string()).is_client_error());
    }

    #[test]
    fn storage_errors_map_to_storage_unavailable() {
        let err: AppError = redb::StorageError::Io(std::io::Error::other("disk gone")).into();
        assert!(
            matches!(err, AppError::StorageUnavailable(ref msg) if msg.contains("disk gone")),
            "unexpected mapping: {:?}",
            err
        );
    }
}
