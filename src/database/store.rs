use async_trait::async_trait;

use crate::filter::{LabelFilter, RecipeFilter};
use crate::types::UserId;

use super::manager::DatabaseError;
use super::models::{Label, LabelKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges};

/// Storage backend seam.
///
/// Label and recipe methods take the requesting user explicitly; rows owned
/// by anyone else are invisible and surface as `DatabaseError::NotFound`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError>;

    /// Ordered by name descending, then id descending
    async fn list_labels(&self, owner: UserId, kind: LabelKind, filter: LabelFilter) -> Result<Vec<Label>, DatabaseError>;
    /// Subset of `ids` owned by `owner`, in id order. Unknown ids are skipped.
    async fn labels_by_ids(&self, owner: UserId, kind: LabelKind, ids: &[i64]) -> Result<Vec<Label>, DatabaseError>;
    async fn get_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<Label, DatabaseError>;
    async fn create_label(&self, owner: UserId, kind: LabelKind, name: String) -> Result<Label, DatabaseError>;
    async fn rename_label(&self, owner: UserId, kind: LabelKind, id: i64, name: String) -> Result<Label, DatabaseError>;
    async fn delete_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<(), DatabaseError>;

    /// Newest first, each recipe at most once
    async fn list_recipes(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError>;
    async fn get_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError>;
    /// Fails with `DatabaseError::UnknownLabel` if a label id is not the owner's
    async fn create_recipe(&self, owner: UserId, recipe: NewRecipe) -> Result<Recipe, DatabaseError>;
    /// Same label check as `create_recipe`, for the lists being replaced
    async fn update_recipe(&self, owner: UserId, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError>;
    /// Returns the removed recipe so callers can release its image
    async fn delete_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError>;
    /// Returns the updated recipe and the image path it replaced, swapped atomically
    async fn set_recipe_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), DatabaseError>;
}

pub(crate) fn label_not_found(kind: LabelKind, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {} not found", kind.display_name(), id))
}

pub(crate) fn recipe_not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("Recipe {} not found", id))
}
