//! Password-gated retrieval with view accounting.

use crate::error::AppError;
use crate::models::item::Access;
use crate::Database;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a retrieval attempt.
///
/// Password outcomes are normal results, not errors, and stay distinct so a
/// client can tell an initial prompt from a retry prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Retrieval {
    Content { content: String, view_count: u64 },
    PasswordRequired,
    PasswordIncorrect,
    NotFound,
}

/// Resolves reads against the item store.
pub struct RetrievalGate;

impl RetrievalGate {
    /// Resolve a read of `key` with an optional password.
    ///
    /// The view count advances once, and only when content is revealed. The
    /// password check and the increment run against the same row in one
    /// write transaction. The returned count is the post-increment value.
    ///
    /// # Errors
    /// Storage and deserialization failures; absent or expired keys resolve
    /// to [`Retrieval::NotFound`] instead.
    pub fn resolve(
        db: &Database,
        key: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Retrieval, AppError> {
        let viewed = db.items.view_if(key, now, |item| match item.unlock(password) {
            Access::Granted(content) => Ok(content.to_string()),
            Access::PasswordRequired => Err(Retrieval::PasswordRequired),
            Access::PasswordIncorrect => {
                tracing::debug!(key = %item.key, "Rejected incorrect password");
                Err(Retrieval::PasswordIncorrect)
            }
        })?;

        Ok(match viewed {
            None => Retrieval::NotFound,
            Some(Ok((content, view_count))) => Retrieval::Content {
                content,
                view_count,
            },
            Some(Err(outcome)) => outcome,
        })
    }
}
