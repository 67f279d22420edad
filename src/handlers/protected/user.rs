// handlers/protected/user.rs - GET|PATCH /api/user/me

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::Value;

use crate::auth::hash_password;
use crate::config::config;
use crate::database::models::UserChanges;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::schema::{UserRepr, UserUpdate};
use crate::state::AppState;

pub async fn me_get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<UserRepr> {
    let user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found or inactive"))?;

    Ok(ApiResponse::success(UserRepr::from(&user)))
}

/// Name and password are writable; a new password is hashed before storage.
pub async fn me_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserRepr> {
    let Json(payload) = payload?;
    let update = UserUpdate::parse(&payload, config().security.min_password_length)?;

    let password_hash = match update.password.as_deref() {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };
    let user = state
        .store
        .update_user(
            auth.id,
            UserChanges {
                name: update.name,
                password_hash,
            },
        )
        .await?;

    tracing::debug!("User {} updated their profile", user.id);
    Ok(ApiResponse::success(UserRepr::from(&user)))
}
