//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two surfaces share one Axum router: the admin content API the local
//! editor talks to (development only), and the read-only page fragments the
//! live site embeds.

pub mod content;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route(
            "/api/admin/content",
            get(content::get_content).post(content::save_content),
        )
        .route("/api/admin/pages/{kind}/{id}", put(content::save_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), content::require_admin));

    Router::new()
        .merge(admin)
        .route("/api/pages/{kind}/{slug}", get(pages::get_page))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::test_support::{get, send, state};

    #[tokio::test]
    async fn healthz_is_ok_in_any_environment() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(state(dir.path(), "production"), get("/healthz")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(state(dir.path(), "development"), get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
