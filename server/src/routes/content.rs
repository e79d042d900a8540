//! Admin content API.
//!
//! Whole-array reads and writes of one content kind, plus a page save that
//! merges one record's builder page under the store's write lock. Only
//! answers when the
//! server runs in the development environment; elsewhere every admin route
//! is a 404 so the surface is indistinguishable from a missing route.

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use canvas::content::{ContentError, ContentKind, PageSnapshot, SaveError};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::StoreError;
use crate::state::AppState;

type ApiError = (StatusCode, &'static str);

#[derive(Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveContentBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<Value>,
}

/// Hide the admin API outside development.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.admin_enabled() {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    next.run(request).await
}

/// `GET /api/admin/content?type=<kind>`: the full array for one kind.
pub async fn get_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let kind = parse_kind(query.kind.as_deref())?;
    Ok(Json(state.store.read(kind).await))
}

/// `POST /api/admin/content`: replace the array for one kind.
pub async fn save_content(
    State(state): State<AppState>,
    Json(body): Json<SaveContentBody>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(Some(&body.kind))?;
    state
        .store
        .write(kind, &body.data)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(json!({ "success": true })))
}

/// `PUT /api/admin/pages/{kind}/{id}`: replace one record's blocks and
/// canvas height, leaving its other fields as stored.
pub async fn save_page(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(snapshot): Json<PageSnapshot>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(Some(&kind))?;
    state
        .store
        .save_page(kind, &id, &snapshot)
        .await
        .map_err(save_error_to_status)?;
    Ok(Json(json!({ "success": true })))
}

fn parse_kind(raw: Option<&str>) -> Result<ContentKind, ApiError> {
    raw.and_then(|s| s.parse().ok())
        .ok_or((StatusCode::BAD_REQUEST, "Invalid type"))
}

fn store_error_to_status(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "content write failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Error saving content")
}

fn save_error_to_status(err: SaveError<StoreError>) -> ApiError {
    match err {
        SaveError::Content(ContentError::RecordNotFound(id)) => {
            tracing::debug!(%id, "page save for unknown record");
            (StatusCode::NOT_FOUND, "Page not found")
        }
        SaveError::Content(ContentError::UnknownKind(_)) => (StatusCode::BAD_REQUEST, "Invalid type"),
        err => {
            tracing::error!(error = %err, "page save failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error saving content")
        }
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
