//! Favorites handlers: a per-user set of recipe ids on the user document.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ServiceError;
use crate::models::Recipe;
use crate::server::auth::AuthUser;
use crate::server::AppState;

/// GET /favorites: the caller's favorite recipes, in the order they were
/// added. Ids of since-deleted recipes drop out silently.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Recipe>>, ServiceError> {
    let ids = state.store.users().favorite_ids(&user.user_id).await?;
    let recipes = state.store.recipes().by_ids(&ids).await?;
    Ok(Json(recipes))
}

/// PUT /favorites/{recipe_id}: idempotent add.
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(recipe_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state
        .store
        .users()
        .add_favorite(&user.user_id, &recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /favorites/{recipe_id}
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(recipe_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state
        .store
        .users()
        .remove_favorite(&user.user_id, &recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
