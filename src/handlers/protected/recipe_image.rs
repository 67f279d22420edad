// handlers/protected/recipe_image.rs - POST /api/recipe/recipes/:id/upload-image

use axum::{
    extract::{Multipart, Path, State},
    Extension,
};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::schema::RecipeImageRepr;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// Accepts multipart/form-data with a single `image` file part.
/// The image path replaced by the store write, if any, is removed afterwards.
pub async fn upload_image_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<RecipeImageRepr> {
    state.store.get_recipe(auth.id, id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::bad_request(e.body_text()))? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::field_error(IMAGE_FIELD, "No file was submitted."))?;

    let stored = state.media.save_recipe_image(&file_name, &bytes).await?;
    let (updated, previous) = match state.store.set_recipe_image(auth.id, id, Some(stored.clone())).await {
        Ok(swapped) => swapped,
        Err(e) => {
            state.media.remove(&stored).await;
            return Err(e.into());
        }
    };

    if let Some(previous) = previous.as_deref() {
        state.media.remove(previous).await;
    }

    tracing::info!("User {} uploaded image for recipe {}", auth.id, id);
    Ok(ApiResponse::success(RecipeImageRepr::new(&updated, &state.media)))
}
