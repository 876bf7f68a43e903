//! Category and cuisine listing handlers.

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ServiceError;
use crate::models::Taxon;
use crate::server::AppState;

/// GET /categories
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Taxon>>, ServiceError> {
    Ok(Json(state.store.categories().list().await?))
}

/// GET /categories/{slug}
pub async fn category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Taxon>, ServiceError> {
    let category = state
        .store
        .categories()
        .by_slug(&slug)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(category))
}

/// GET /cuisines
pub async fn cuisines(State(state): State<AppState>) -> Result<Json<Vec<Taxon>>, ServiceError> {
    Ok(Json(state.store.cuisines().list().await?))
}

/// GET /cuisines/{slug}
pub async fn cuisine_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Taxon>, ServiceError> {
    let cuisine = state
        .store
        .cuisines()
        .by_slug(&slug)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(cuisine))
}
