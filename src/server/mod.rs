//! HTTP surface: router, shared state, and the per-entity handler modules.

pub mod auth;
pub mod collections;
pub mod favorites;
pub mod recipes;
pub mod sessions;
pub mod taxonomy;

pub use sessions::SessionStore;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::Store;

/// Application state shared across handlers.
///
/// The store handle and session store are injected here at startup; no
/// handler reaches for global state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<SessionStore>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required).
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Builds the full application router.
///
/// Browse-style reads are open; handlers that write, or that serve data
/// scoped to the caller, require the [`auth::AuthUser`] extractor and
/// reject sessionless requests with 401.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipes/{id}",
            get(recipes::get).put(recipes::update).delete(recipes::delete),
        )
        .route("/recipes/{id}/ratings", post(recipes::rate))
        .route("/recipes/{id}/similar", get(recipes::similar))
        .route("/explore/{view}", get(recipes::explore))
        .route("/dietary/{tag}", get(recipes::dietary))
        .route("/categories", get(taxonomy::categories))
        .route("/categories/{slug}", get(taxonomy::category_by_slug))
        .route("/cuisines", get(taxonomy::cuisines))
        .route("/cuisines/{slug}", get(taxonomy::cuisine_by_slug))
        .route(
            "/collections",
            get(collections::mine).post(collections::create),
        )
        .route("/collections/public", get(collections::public))
        .route(
            "/collections/{id}",
            get(collections::get)
                .put(collections::update)
                .delete(collections::delete),
        )
        .route(
            "/collections/{id}/recipes/{recipe_id}",
            put(collections::add_recipe).delete(collections::remove_recipe),
        )
        .route("/favorites", get(favorites::list))
        .route(
            "/favorites/{recipe_id}",
            put(favorites::add).delete(favorites::remove),
        )
        .route("/users/{id}/recipes", get(recipes::by_author))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
