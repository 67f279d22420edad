// handlers/protected/label.rs - /api/recipe/tags and /api/recipe/ingredients
//
// Tags and ingredients share one implementation parameterised by `LabelKind`;
// the `tags` and `ingredients` modules bind the kind for routing.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::LabelKind;
use crate::filter::{LabelFilter, LabelListQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::schema::{LabelRepr, LabelWrite, WriteMode};
use crate::state::AppState;

async fn list(state: AppState, auth: AuthUser, kind: LabelKind, query: LabelListQuery) -> ApiResult<Vec<LabelRepr>> {
    let filter = LabelFilter::from_query(&query)?;
    let labels = state.store.list_labels(auth.id, kind, filter).await?;
    Ok(ApiResponse::success(labels.into_iter().map(LabelRepr::from).collect()))
}

async fn create(
    state: AppState,
    auth: AuthUser,
    kind: LabelKind,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<LabelRepr> {
    let Json(payload) = payload?;
    let write = LabelWrite::parse(&payload, WriteMode::Create)?;
    let name = write.name.unwrap_or_default();

    let label = state.store.create_label(auth.id, kind, name).await?;
    tracing::debug!("User {} created {} {}", auth.id, kind.display_name(), label.id);
    Ok(ApiResponse::created(LabelRepr::from(label)))
}

async fn retrieve(state: AppState, auth: AuthUser, kind: LabelKind, id: i64) -> ApiResult<LabelRepr> {
    let label = state.store.get_label(auth.id, kind, id).await?;
    Ok(ApiResponse::success(LabelRepr::from(label)))
}

async fn update(
    state: AppState,
    auth: AuthUser,
    kind: LabelKind,
    id: i64,
    mode: WriteMode,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<LabelRepr> {
    let Json(payload) = payload?;
    let write = LabelWrite::parse(&payload, mode)?;

    let label = match write.name {
        Some(name) => state.store.rename_label(auth.id, kind, id, name).await?,
        None => state.store.get_label(auth.id, kind, id).await?,
    };
    Ok(ApiResponse::success(LabelRepr::from(label)))
}

async fn delete(state: AppState, auth: AuthUser, kind: LabelKind, id: i64) -> ApiResult<()> {
    state.store.delete_label(auth.id, kind, id).await?;
    tracing::debug!("User {} deleted {} {}", auth.id, kind.display_name(), id);
    Ok(ApiResponse::no_content())
}

macro_rules! label_handlers {
    ($module:ident, $kind:expr) => {
        pub mod $module {
            use super::*;

            pub async fn list_get(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                query: Result<Query<LabelListQuery>, QueryRejection>,
            ) -> ApiResult<Vec<LabelRepr>> {
                let Query(query) = query?;
                list(state, auth, $kind, query).await
            }

            pub async fn create_post(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                payload: Result<Json<Value>, JsonRejection>,
            ) -> ApiResult<LabelRepr> {
                create(state, auth, $kind, payload).await
            }

            pub async fn item_get(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                Path(id): Path<i64>,
            ) -> ApiResult<LabelRepr> {
                retrieve(state, auth, $kind, id).await
            }

            pub async fn item_put(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                Path(id): Path<i64>,
                payload: Result<Json<Value>, JsonRejection>,
            ) -> ApiResult<LabelRepr> {
                update(state, auth, $kind, id, WriteMode::Replace, payload).await
            }

            pub async fn item_patch(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                Path(id): Path<i64>,
                payload: Result<Json<Value>, JsonRejection>,
            ) -> ApiResult<LabelRepr> {
                update(state, auth, $kind, id, WriteMode::Partial, payload).await
            }

            pub async fn item_delete(
                State(state): State<AppState>,
                Extension(auth): Extension<AuthUser>,
                Path(id): Path<i64>,
            ) -> ApiResult<()> {
                delete(state, auth, $kind, id).await
            }
        }
    };
}

label_handlers!(tags, LabelKind::Tag);
label_handlers!(ingredients, LabelKind::Ingredient);
