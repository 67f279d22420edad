// handlers/protected/recipe.rs - /api/recipe/recipes[/:id]
//
// List and write responses use `RecipeSummary` (label ids); the single-item
// GET returns `RecipeDetail` with nested tags and ingredients.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde_json::Value;

use crate::filter::{RecipeFilter, RecipeListQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::schema::{RecipeDetail, RecipeSummary, RecipeWrite, WriteMode};
use crate::state::AppState;

/// GET /api/recipe/recipes?tags=1,2&ingredients=3
pub async fn list_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Result<Query<RecipeListQuery>, QueryRejection>,
) -> ApiResult<Vec<RecipeSummary>> {
    let Query(query) = query?;
    let filter = RecipeFilter::from_query(&query)?;
    let recipes = state.store.list_recipes(auth.id, &filter).await?;
    Ok(ApiResponse::success(recipes.iter().map(RecipeSummary::from).collect()))
}

/// POST /api/recipe/recipes
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecipeSummary> {
    let Json(payload) = payload?;
    let write = RecipeWrite::parse(&payload, WriteMode::Create)?;

    let recipe = state.store.create_recipe(auth.id, write.into_new()?).await?;
    tracing::info!("User {} created recipe {}", auth.id, recipe.id);
    Ok(ApiResponse::created(RecipeSummary::from(&recipe)))
}

/// GET /api/recipe/recipes/:id
pub async fn item_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<RecipeDetail> {
    let recipe = state.store.get_recipe(auth.id, id).await?;
    let detail = RecipeDetail::load(state.store.as_ref(), auth.id, &recipe).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /api/recipe/recipes/:id
pub async fn item_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecipeSummary> {
    update(state, auth, id, WriteMode::Replace, payload).await
}

/// PATCH /api/recipe/recipes/:id
pub async fn item_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecipeSummary> {
    update(state, auth, id, WriteMode::Partial, payload).await
}

async fn update(
    state: AppState,
    auth: AuthUser,
    id: i64,
    mode: WriteMode,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecipeSummary> {
    let Json(payload) = payload?;
    // 404 for a foreign recipe takes precedence over payload errors
    state.store.get_recipe(auth.id, id).await?;

    let write = RecipeWrite::parse(&payload, mode)?;

    let recipe = state.store.update_recipe(auth.id, id, write.into_changes()).await?;
    tracing::debug!("User {} updated recipe {}", auth.id, recipe.id);
    Ok(ApiResponse::success(RecipeSummary::from(&recipe)))
}

/// DELETE /api/recipe/recipes/:id - also removes the stored image
pub async fn item_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let recipe = state.store.delete_recipe(auth.id, id).await?;
    if let Some(image) = recipe.image.as_deref() {
        state.media.remove(image).await;
    }

    tracing::info!("User {} deleted recipe {}", auth.id, id);
    Ok(ApiResponse::no_content())
}
