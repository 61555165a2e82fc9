//! Expiry policy shared by lazy (per-access) and active (sweep) expiry.
//!
//! Every path that decides whether an item still exists goes through
//! [`is_live`]; nothing else compares expiry timestamps against the clock.

use crate::constants::{DEFAULT_TTL_MINUTES, MAX_TTL_DAYS};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};

/// Expiry applied when a create request carries none.
pub fn default_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(DEFAULT_TTL_MINUTES)
}

/// Latest expiry accepted for an item created at `now`.
pub fn max_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(MAX_TTL_DAYS)
}

/// Validate a caller-requested expiry.
///
/// # Returns
/// `requested` unchanged when it lies in `(now, now + 30 days]`.
///
/// # Errors
/// [`AppError::ExpiryNotFuture`] when `requested <= now`,
/// [`AppError::ExpiryTooFar`] when it exceeds the horizon.
pub fn validate(requested: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    if requested <= now {
        return Err(AppError::ExpiryNotFuture);
    }
    if requested > max_expiry(now) {
        return Err(AppError::ExpiryTooFar {
            max_days: MAX_TTL_DAYS,
        });
    }
    Ok(requested)
}

/// Resolve the expiry for a new item: default when absent, validated otherwise.
///
/// # Errors
/// Propagates [`validate`] failures.
pub fn resolve(
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, AppError> {
    match requested {
        Some(requested) => validate(requested, now),
        None => Ok(default_expiry(now)),
    }
}

/// Liveness predicate: no expiry, or an expiry strictly after `now`.
pub fn is_live(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(expires_at) => expires_at > now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn default_expiry_is_ten_minutes_out() {
        let now = fixed_now();
        assert_eq!(default_expiry(now) - now, Duration::minutes(10));
        assert_eq!(resolve(None, now).unwrap(), default_expiry(now));
    }

    #[test]
    fn validate_rejects_now_and_past() {
        let now = fixed_now();
        assert!(matches!(validate(now, now), Err(AppError::ExpiryNotFuture)));
        assert!(matches!(
            validate(now - Duration::seconds(1), now),
            Err(AppError::ExpiryNotFuture)
        ));
    }

    #[test]
    fn validate_horizon_is_inclusive() {
        let now = fixed_now();
        let horizon = now + Duration::days(30);
        assert_eq!(validate(horizon, now).unwrap(), horizon);
        assert!(matches!(
            validate(horizon + Duration::seconds(1), now),
            Err(AppError::ExpiryTooFar { max_days: 30 })
        ));
    }

    #[test]
    fn validate_returns_requested_unchanged() {
        let now = fixed_now();
        let requested = now + Duration::milliseconds(1);
        assert_eq!(resolve(Some(requested), now).unwrap(), requested);
    }

    #[test]
    fn liveness_boundary_is_exclusive() {
        let now = fixed_now();
        assert!(is_live(None, now));
        assert!(is_live(Some(now + Duration::milliseconds(1)), now));
        assert!(!is_live(Some(now), now));
        assert!(!is_live(Some(now - Duration::minutes(1)), now));
    }
}
