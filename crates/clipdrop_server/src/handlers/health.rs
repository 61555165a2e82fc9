//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// Report that the process is serving requests.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
