//! Recipe browse, authoring, and rating handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::db::{RecipePage, RecipeQuery};
use crate::error::ServiceError;
use crate::models::{Recipe, RecipeInput};
use crate::server::auth::AuthUser;
use crate::server::AppState;

/// How many recipes each fixed-size feed returns.
const EXPLORE_LIMIT: i64 = 12;
const FEATURED_LIMIT: i64 = 5;
const SIMILAR_LIMIT: i64 = 4;
const DIETARY_LIMIT: i64 = 10;

/// GET /recipes: the filtered, sorted, paginated browse listing.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<RecipePage>, ServiceError> {
    Ok(Json(state.store.recipes().list(&query).await?))
}

/// GET /recipes/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ServiceError> {
    let recipe = state
        .store
        .recipes()
        .by_id(&id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(Json(recipe))
}

/// POST /recipes: author a new recipe.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<RecipeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    // The author's display name is denormalized onto the recipe.
    let author = state
        .store
        .users()
        .by_id(&user.user_id)
        .await?
        .ok_or(ServiceError::Unauthorized)?;

    let recipe = state
        .store
        .recipes()
        .create(input, &user.user_id, &author.name)
        .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// PUT /recipes/{id}: owner-only edit.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<Recipe>, ServiceError> {
    let recipe = state
        .store
        .recipes()
        .update(&id, &user.user_id, input)
        .await?;
    Ok(Json(recipe))
}

/// DELETE /recipes/{id}: owner-only.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.store.recipes().delete(&id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub value: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /recipes/{id}/ratings: submit or replace the caller's rating.
pub async fn rate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> Result<Json<Recipe>, ServiceError> {
    let recipe = state
        .store
        .recipes()
        .rate(&id, &user.user_id, req.value, req.comment)
        .await?;
    Ok(Json(recipe))
}

/// GET /recipes/{id}/similar
pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Recipe>>, ServiceError> {
    Ok(Json(
        state.store.recipes().similar_to(&id, SIMILAR_LIMIT).await?,
    ))
}

/// GET /explore/{view}: the fixed home-page style feeds.
///
/// `seasonal` intentionally shares the popular query until a dedicated
/// selection exists for it.
pub async fn explore(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> Result<Json<Vec<Recipe>>, ServiceError> {
    let recipes = state.store.recipes();
    let feed = match view.as_str() {
        "new" => recipes.newest(EXPLORE_LIMIT).await?,
        "popular" | "seasonal" => recipes.popular(EXPLORE_LIMIT).await?,
        "featured" => recipes.featured(FEATURED_LIMIT).await?,
        "quick-easy" => recipes.quick_easy(EXPLORE_LIMIT).await?,
        _ => return Err(ServiceError::NotFound),
    };
    Ok(Json(feed))
}

/// GET /dietary/{tag}: best recipes carrying a dietary tag.
pub async fn dietary(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<Vec<Recipe>>, ServiceError> {
    Ok(Json(
        state.store.recipes().by_dietary(&tag, DIETARY_LIMIT).await?,
    ))
}

/// GET /users/{id}/recipes: everything a user has authored.
pub async fn by_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Recipe>>, ServiceError> {
    Ok(Json(state.store.recipes().by_author(&id).await?))
}
