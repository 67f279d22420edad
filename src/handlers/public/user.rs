// handlers/public/user.rs - POST /api/user/create, POST /api/user/token

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::auth::{generate_jwt, hash_password, verify_password};
use crate::config::config;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema::{TokenRepr, TokenRequest, UserCreate, UserRepr};
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

/// POST /api/user/create - register an account
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserRepr> {
    let Json(payload) = payload?;
    let create = UserCreate::parse(&payload, config().security.min_password_length)?;

    let password_hash = hash_password(&create.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            email: create.email,
            name: create.name,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);
    Ok(ApiResponse::created(UserRepr::from(&user)))
}

/// POST /api/user/token - exchange credentials for a bearer token
///
/// Unknown email, wrong password and inactive accounts all produce the same 400.
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TokenRepr> {
    let Json(payload) = payload?;
    let request = TokenRequest::parse(&payload)?;

    let user = state.store.find_user_by_email(&request.email).await?;
    let verified = match &user {
        Some(user) if user.is_active => verify_password(&request.password, &user.password_hash).await?,
        _ => false,
    };
    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::warn!("Failed token request for {}", request.email);
            return Err(ApiError::field_error("non_field_errors", BAD_CREDENTIALS));
        }
    };

    let token = generate_jwt(&user)?;
    tracing::debug!("Issued token for user {}", user.id);
    Ok(ApiResponse::success(TokenRepr { token }))
}
