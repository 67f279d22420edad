//! Recipe representations and write validation.
//!
//! Both read forms share [`RecipeBase`]; the summary carries bare label ids and
//! the detail form nests the full tag and ingredient objects.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::database::models::{LabelKind, NewRecipe, Recipe, RecipeChanges};
use crate::database::Store;
use crate::error::ApiError;
use crate::types::UserId;

use super::fields::{self, FieldErrors, WriteMode};
use super::label::LabelRepr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeBase {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: String,
    pub link: String,
}

impl From<&Recipe> for RecipeBase {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: format_price(recipe.price),
            link: recipe.link.clone(),
        }
    }
}

fn format_price(price: Decimal) -> String {
    format!("{:.2}", price)
}

/// List and write form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    #[serde(flatten)]
    pub base: RecipeBase,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            base: RecipeBase::from(recipe),
            tags: recipe.tag_ids.clone(),
            ingredients: recipe.ingredient_ids.clone(),
        }
    }
}

/// Retrieve form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub base: RecipeBase,
    pub tags: Vec<LabelRepr>,
    pub ingredients: Vec<LabelRepr>,
}

impl RecipeDetail {
    pub async fn load(store: &dyn Store, owner: UserId, recipe: &Recipe) -> Result<Self, ApiError> {
        let tags = store.labels_by_ids(owner, LabelKind::Tag, &recipe.tag_ids).await?;
        let ingredients = store
            .labels_by_ids(owner, LabelKind::Ingredient, &recipe.ingredient_ids)
            .await?;

        Ok(Self {
            base: RecipeBase::from(recipe),
            tags: tags.into_iter().map(LabelRepr::from).collect(),
            ingredients: ingredients.into_iter().map(LabelRepr::from).collect(),
        })
    }
}

/// Parsed recipe payload. Read-only and unknown keys are ignored.
///
/// Label ids are checked against the owner by the store, inside the write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeWrite {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

impl RecipeWrite {
    pub fn parse(payload: &Value, mode: WriteMode) -> Result<Self, ApiError> {
        let map = fields::object(payload)?;
        let mut errors = FieldErrors::default();

        let write = Self {
            title: fields::text(map, "title", mode, false, &mut errors),
            time_minutes: fields::non_negative_int(map, "time_minutes", mode, &mut errors),
            price: fields::price(map, "price", mode, &mut errors),
            link: fields::text(map, "link", WriteMode::Partial, true, &mut errors),
            tag_ids: fields::id_list(map, LabelKind::Tag.field(), &mut errors),
            ingredient_ids: fields::id_list(map, LabelKind::Ingredient.field(), &mut errors),
        };

        errors.into_result()?;
        Ok(write)
    }

    pub fn into_new(self) -> Result<NewRecipe, ApiError> {
        let (Some(title), Some(time_minutes), Some(price)) = (self.title, self.time_minutes, self.price) else {
            return Err(ApiError::validation_error("title, time_minutes and price are required", None));
        };

        Ok(NewRecipe {
            title,
            time_minutes,
            price,
            link: self.link.unwrap_or_default(),
            tag_ids: self.tag_ids.unwrap_or_default(),
            ingredient_ids: self.ingredient_ids.unwrap_or_default(),
        })
    }

    pub fn into_changes(self) -> RecipeChanges {
        RecipeChanges {
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            tag_ids: self.tag_ids,
            ingredient_ids: self.ingredient_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn recipe() -> Recipe {
        Recipe {
            id: 10,
            owner_id: 1,
            title: "Thai curry".into(),
            time_minutes: 30,
            price: Decimal::new(5, 0),
            link: String::new(),
            image: None,
            tag_ids: vec![2],
            ingredient_ids: vec![],
        }
    }

    #[test]
    fn summary_uses_ids_and_two_place_price() {
        let value = serde_json::to_value(RecipeSummary::from(&recipe())).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 10,
                "title": "Thai curry",
                "time_minutes": 30,
                "price": "5.00",
                "link": "",
                "tags": [2],
                "ingredients": []
            })
        );
    }

    #[tokio::test]
    async fn detail_nests_labels() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser { email: "a@b.io".into(), name: "A".into(), password_hash: "x".into() })
            .await
            .unwrap();
        let owner = UserId(user.id);
        let tag = store.create_label(owner, LabelKind::Tag, "Vegan".into()).await.unwrap();

        let mut recipe = recipe();
        recipe.owner_id = user.id;
        recipe.tag_ids = vec![tag.id];

        let detail = RecipeDetail::load(&store, owner, &recipe).await.unwrap();
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["tags"], json!([{"id": tag.id, "name": "Vegan"}]));
        assert_eq!(value["ingredients"], json!([]));
        assert_eq!(value["price"], "5.00");
    }

    #[test]
    fn create_requires_core_fields() {
        let err = RecipeWrite::parse(&json!({"link": "x"}), WriteMode::Create).unwrap_err();
        match err {
            ApiError::ValidationError { field_errors: Some(errors), .. } => {
                assert!(errors.contains_key("title"));
                assert!(errors.contains_key("time_minutes"));
                assert!(errors.contains_key("price"));
                assert!(!errors.contains_key("link"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn create_defaults_optional_fields() {
        let write = RecipeWrite::parse(
            &json!({"id": 500, "title": "Soup", "time_minutes": "10", "price": "2.5"}),
            WriteMode::Create,
        )
        .unwrap();
        let new = write.into_new().unwrap();
        assert_eq!(new.title, "Soup");
        assert_eq!(new.time_minutes, 10);
        assert_eq!(new.price.to_string(), "2.50");
        assert_eq!(new.link, "");
        assert!(new.tag_ids.is_empty());
    }

    #[test]
    fn partial_keeps_absent_fields_unset() {
        let changes = RecipeWrite::parse(&json!({"tags": []}), WriteMode::Partial)
            .unwrap()
            .into_changes();
        assert_eq!(changes.tag_ids, Some(vec![]));
        assert_eq!(changes.title, None);
        assert_eq!(changes.ingredient_ids, None);
    }
}
