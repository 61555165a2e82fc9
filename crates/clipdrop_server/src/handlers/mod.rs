//! HTTP request handlers.

/// Sweep trigger for external schedulers.
pub mod cleanup;
/// Create, retrieve, probe, and delete items.
pub mod clipboard;
pub mod health;

use crate::{AppError, AppState, Database};

/// Run a blocking storage call on the blocking pool, bounded by the configured
/// storage timeout.
///
/// # Arguments
/// - `state`: Application state holding the database and timeout.
/// - `op`: Operation name used in logs.
/// - `call`: Storage work to run against the database.
///
/// # Errors
/// Propagates the call's own error; a timeout or a failed blocking task
/// becomes [`AppError::StorageUnavailable`].
pub(crate) async fn with_storage<T, F>(
    state: &AppState,
    op: &'static str,
    call: F,
) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
{
    let db = state.db.clone();
    let timeout = state.config.storage_timeout();
    let task = tokio::task::spawn_blocking(move || call(&db));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            tracing::error!(op, "Storage task failed: {}", err);
            Err(AppError::StorageUnavailable(format!("{} task failed", op)))
        }
        Err(_) => {
            tracing::warn!(op, timeout_ms = timeout.as_millis() as u64, "Storage call timed out");
            Err(AppError::StorageUnavailable(format!(
                "{} timed out after {}ms",
                op,
                timeout.as_millis()
            )))
        }
    }
}
