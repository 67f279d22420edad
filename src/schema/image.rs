use serde::Serialize;

use crate::database::models::Recipe;
use crate::media::MediaStorage;

/// Upload response: identity plus the public image URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeImageRepr {
    pub id: i64,
    pub image: Option<String>,
}

impl RecipeImageRepr {
    pub fn new(recipe: &Recipe, media: &MediaStorage) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image.as_deref().map(|path| media.url(path)),
        }
    }
}
