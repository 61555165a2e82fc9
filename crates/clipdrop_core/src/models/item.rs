//! Clipboard item model, access checks, and request payloads.

use crate::constants::MAX_CONTENT_CHARS;
use crate::error::AppError;
use crate::expiry;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// A live item as read from the store.
///
/// Content and password stay private: callers learn whether a password is set
/// via [`Item::has_password`] and reach the content only through
/// [`Item::unlock`].
#[derive(Clone)]
pub struct Item {
    pub key: String,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    content: String,
    password: Option<String>,
}

/// Result of presenting a password to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    Granted(&'a str),
    PasswordRequired,
    PasswordIncorrect,
}

/// Request payload for creating an item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub content: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Query parameters for retrieving an item.
#[derive(Debug, Default, Deserialize)]
pub struct RetrieveQuery {
    pub pwd: Option<String>,
}

impl Item {
    pub(crate) fn from_parts(
        key: String,
        content: String,
        password: Option<String>,
        view_count: u64,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            key,
            view_count,
            created_at,
            expires_at,
            content,
            password,
        }
    }

    /// Whether the item is still visible at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        expiry::is_live(self.expires_at, now)
    }

    /// Whether reads must present a password.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Content length in characters, available without unlocking.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Check a supplied password and release the content on success.
    ///
    /// Comparison is exact and case-sensitive. An empty supplied password
    /// counts as none.
    pub fn unlock(&self, supplied: Option<&str>) -> Access<'_> {
        let Some(expected) = self.password.as_deref().filter(|p| !p.is_empty()) else {
            return Access::Granted(&self.content);
        };
        match supplied.filter(|p| !p.is_empty()) {
            None => Access::PasswordRequired,
            Some(supplied) if supplied == expected => Access::Granted(&self.content),
            Some(_) => Access::PasswordIncorrect,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("key", &self.key)
            .field("view_count", &self.view_count)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("content_chars", &self.content_chars())
            .field("has_password", &self.has_password())
            .finish()
    }
}

/// Validate item content.
///
/// # Errors
/// [`AppError::ContentInvalid`] when content is blank or longer than
/// [`MAX_CONTENT_CHARS`] characters.
pub fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::ContentInvalid("content is required".to_string()));
    }
    let chars = content.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(AppError::ContentInvalid(format!(
            "content is {} characters; maximum is {}",
            chars, MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

/// Treat an empty password as no password. Non-empty values are kept verbatim.
pub fn normalize_password(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.is_empty())
}
