//! Recipe-collection handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::db::CollectionUpdate;
use crate::error::ServiceError;
use crate::models::RecipeCollection;
use crate::server::auth::{maybe_user, AuthUser};
use crate::server::AppState;

const PUBLIC_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicListParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /collections: the caller's own collections.
pub async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<RecipeCollection>>, ServiceError> {
    Ok(Json(state.store.collections().for_user(&user.user_id).await?))
}

/// GET /collections/public: publicly shared collections.
pub async fn public(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> Result<Json<Vec<RecipeCollection>>, ServiceError> {
    let limit = params.limit.unwrap_or(PUBLIC_LIMIT).clamp(1, 50);
    Ok(Json(state.store.collections().public(limit).await?))
}

/// POST /collections
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let collection = state
        .store
        .collections()
        .create(&req.name, req.description, req.is_public, &user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET /collections/{id}: public route, but private collections are only
/// visible to their owner. Anyone else sees not-found.
pub async fn get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RecipeCollection>, ServiceError> {
    let collection = state
        .store
        .collections()
        .by_id(&id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if !collection.is_public {
        let caller = maybe_user(&state, &headers);
        if caller.as_deref() != Some(collection.user_id.as_str()) {
            return Err(ServiceError::NotFound);
        }
    }
    Ok(Json(collection))
}

/// PUT /collections/{id}: owner-only metadata update.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<CollectionUpdate>,
) -> Result<Json<RecipeCollection>, ServiceError> {
    let collection = state
        .store
        .collections()
        .update(&id, &user.user_id, patch)
        .await?;
    Ok(Json(collection))
}

/// DELETE /collections/{id}: owner-only.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.store.collections().delete(&id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /collections/{id}/recipes/{recipe_id}: add to the membership set.
pub async fn add_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, recipe_id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    state
        .store
        .collections()
        .add_recipe(&id, &user.user_id, &recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /collections/{id}/recipes/{recipe_id}
pub async fn remove_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, recipe_id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    state
        .store
        .collections()
        .remove_recipe(&id, &user.user_id, &recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
