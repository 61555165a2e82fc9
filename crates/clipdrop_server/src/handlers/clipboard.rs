//! Item HTTP handlers.

use super::with_storage;
use crate::{
    error::HttpError,
    models::item::{CreateItemRequest, RetrieveQuery},
    AppError, AppState, Retrieval, RetrievalGate,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

/// Decode a create body, reporting a missing or non-string `content` as
/// invalid content.
fn parse_create_body(body: Value) -> Result<CreateItemRequest, HttpError> {
    if !body.get("content").is_some_and(Value::is_string) {
        return Err(AppError::ContentInvalid("content is required".to_string()).into());
    }
    serde_json::from_value(body)
        .map_err(|err| HttpError::MalformedBody(format!("Invalid request body: {}", err)))
}

/// Create a new item.
///
/// # Arguments
/// - `state`: Application state.
/// - `payload`: Content, optional password, optional RFC 3339 expiry.
///
/// # Returns
/// `201` with `{"key": ...}`.
///
/// # Errors
/// `400` for a malformed body; otherwise an error if validation, key
/// allocation, or persistence fails.
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), HttpError> {
    let Json(body) = payload?;
    let req = parse_create_body(body)?;
    let now = Utc::now();
    let key = with_storage(&state, "create", move |db| db.items.create(req, now)).await?;
    tracing::info!(key = %key, "Created item");
    Ok((StatusCode::CREATED, Json(json!({ "key": key }))))
}

/// Retrieve an item, presenting `?pwd=` when the item is protected.
///
/// # Returns
/// `200` with the outcome tagged by `status`: `content`, `password_required`,
/// or `password_incorrect`.
///
/// # Errors
/// `404` for absent or expired keys; storage failures otherwise.
pub async fn get_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Json<Retrieval>, HttpError> {
    let now = Utc::now();
    let outcome = with_storage(&state, "retrieve", move |db| {
        RetrievalGate::resolve(db, &key, query.pwd.as_deref(), now)
    })
    .await?;

    match outcome {
        Retrieval::NotFound => Err(AppError::NotFound.into()),
        outcome => Ok(Json(outcome)),
    }
}

/// Report whether an item needs a password, without revealing or counting.
///
/// Absent keys report `false`.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn protected_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let now = Utc::now();
    let password_required =
        with_storage(&state, "protected", move |db| db.items.has_password(&key, now)).await?;
    Ok(Json(json!({ "password_required": password_required })))
}

/// Delete an item by key.
///
/// # Returns
/// `{"success": true}` when a row was removed.
///
/// # Errors
/// `404` when there was nothing to remove.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let lookup = key.clone();
    let removed = with_storage(&state, "delete", move |db| db.items.delete(&lookup)).await?;
    if !removed {
        return Err(AppError::NotFound.into());
    }
    tracing::info!(key = %key, "Deleted item");
    Ok(Json(json!({ "success": true })))
}
