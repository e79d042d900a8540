//! Rendered page fragments for the live site.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use canvas::content::{ContentKind, PageRecord, record_id};
use canvas::doc::ViewMode;
use canvas::render::render_html;
use serde::Deserialize;
use serde_json::Value;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct PageQuery {
    pub view: Option<ViewMode>,
}

/// `GET /api/pages/{kind}/{slug}?view=desktop|mobile`: the page's blocks as
/// an HTML fragment. A record is matched by `slug`, then by `id`.
pub async fn get_page(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, StatusCode> {
    let kind: ContentKind = kind.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let items = state.store.read(kind).await;
    let record = find_by_slug(&items, &slug).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(render_html(record.blocks(), query.view.unwrap_or_default())))
}

fn find_by_slug(items: &[Value], slug: &str) -> Option<PageRecord> {
    let item = items
        .iter()
        .find(|item| item.get("slug").and_then(Value::as_str) == Some(slug))
        .or_else(|| items.iter().find(|item| record_id(item).as_deref() == Some(slug)))?;
    match PageRecord::from_value(item) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(%slug, error = %e, "page record could not be decoded");
            None
        }
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
