//! Cleanup endpoint for cron-style schedulers.

use super::with_storage;
use crate::{error::HttpError, AppState};
use axum::{extract::State, Json};
use chrono::Utc;
use hyper::{header::AUTHORIZATION, HeaderMap};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Exact, constant-time match of the presented token against the secret.
fn secret_matches(presented: Option<&str>, secret: &str) -> bool {
    presented.is_some_and(|token| bool::from(token.as_bytes().ct_eq(secret.as_bytes())))
}

/// Sweep expired items now.
///
/// When a cron secret is configured the request must carry
/// `Authorization: Bearer <secret>`.
///
/// # Returns
/// `{"success": true, "deleted_count": n, "message": ...}`.
///
/// # Errors
/// `401` on a missing or wrong secret; storage failures otherwise.
pub async fn run_cleanup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    if let Some(secret) = state.config.cron_secret.as_deref() {
        if !secret_matches(bearer_token(&headers), secret) {
            tracing::warn!("Rejected cleanup request with missing or invalid secret");
            return Err(HttpError::Unauthorized);
        }
    }

    let now = Utc::now();
    let removed = with_storage(&state, "sweep", move |db| db.items.sweep(now)).await?;
    tracing::info!(removed, "Cleanup request completed");

    Ok(Json(json!({
        "success": true,
        "deleted_count": removed,
        "message": format!("Deleted {} expired item(s)", removed),
    })))
}

#[cfg(test)]
mod tests {
    use super::{bearer_token, secret_matches};
    use hyper::{header::AUTHORIZATION, HeaderMap};

    #[test]
    fn bearer_token_requires_scheme_prefix() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer  abc ".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some(" abc "));
    }

    #[test]
    fn secret_must_match_exactly() {
        assert!(secret_matches(Some("cron-s3cret"), "cron-s3cret"));
        assert!(!secret_matches(Some(" cron-s3cret "), "cron-s3cret"));
        assert!(!secret_matches(Some("cron-s3cre"), "cron-s3cret"));
        assert!(!secret_matches(Some("Cron-s3cret"), "cron-s3cret"));
        assert!(!secret_matches(Some(""), "cron-s3cret"));
        assert!(!secret_matches(None, "cron-s3cret"));
    }
}
