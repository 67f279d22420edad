use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::filter::{LabelFilter, RecipeFilter};
use crate::types::UserId;

use super::manager::DatabaseError;
use super::models::{Label, LabelKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges};
use super::store::{label_not_found, recipe_not_found, Store};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    tags: BTreeMap<i64, Label>,
    ingredients: BTreeMap<i64, Label>,
    recipes: BTreeMap<i64, Recipe>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn labels(&self, kind: LabelKind) -> &BTreeMap<i64, Label> {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Ingredient => &self.ingredients,
        }
    }

    fn labels_mut(&mut self, kind: LabelKind) -> &mut BTreeMap<i64, Label> {
        match kind {
            LabelKind::Tag => &mut self.tags,
            LabelKind::Ingredient => &mut self.ingredients,
        }
    }

    fn owned_label_mut(&mut self, owner: UserId, kind: LabelKind, id: i64) -> Result<&mut Label, DatabaseError> {
        self.labels_mut(kind)
            .get_mut(&id)
            .filter(|label| label.owner_id == owner.0)
            .ok_or_else(|| label_not_found(kind, id))
    }

    /// First id in `ids` that is not one of `owner`'s labels of this kind
    fn check_labels(&self, owner: UserId, kind: LabelKind, ids: &[i64]) -> Result<(), DatabaseError> {
        let labels = self.labels(kind);
        match ids.iter().find(|id| !labels.get(*id).is_some_and(|label| label.owner_id == owner.0)) {
            Some(&id) => Err(DatabaseError::UnknownLabel { kind, id }),
            None => Ok(()),
        }
    }

    fn owned_recipe_mut(&mut self, owner: UserId, id: i64) -> Result<&mut Recipe, DatabaseError> {
        self.recipes
            .get_mut(&id)
            .filter(|recipe| recipe.owner_id == owner.0)
            .ok_or_else(|| recipe_not_found(id))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::DuplicateEmail(user.email));
        }
        let id = tables.next_id();
        let user = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id.0).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id.0)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        Ok(user.clone())
    }

    async fn list_labels(&self, owner: UserId, kind: LabelKind, filter: LabelFilter) -> Result<Vec<Label>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut labels: Vec<Label> = tables
            .labels(kind)
            .values()
            .filter(|label| label.owner_id == owner.0)
            .filter(|label| {
                !filter.assigned_only
                    || tables
                        .recipes
                        .values()
                        .any(|r| r.owner_id == owner.0 && r.label_ids(kind).contains(&label.id))
            })
            .cloned()
            .collect();
        labels.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(labels)
    }

    async fn labels_by_ids(&self, owner: UserId, kind: LabelKind, ids: &[i64]) -> Result<Vec<Label>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .labels(kind)
            .values()
            .filter(|label| label.owner_id == owner.0 && ids.contains(&label.id))
            .cloned()
            .collect())
    }

    async fn get_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<Label, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .labels(kind)
            .get(&id)
            .filter(|label| label.owner_id == owner.0)
            .cloned()
            .ok_or_else(|| label_not_found(kind, id))
    }

    async fn create_label(&self, owner: UserId, kind: LabelKind, name: String) -> Result<Label, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let label = Label { id, owner_id: owner.0, name };
        tables.labels_mut(kind).insert(id, label.clone());
        Ok(label)
    }

    async fn rename_label(&self, owner: UserId, kind: LabelKind, id: i64, name: String) -> Result<Label, DatabaseError> {
        let mut tables = self.tables.write().await;
        let label = tables.owned_label_mut(owner, kind, id)?;
        label.name = name;
        Ok(label.clone())
    }

    async fn delete_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.owned_label_mut(owner, kind, id)?;
        tables.labels_mut(kind).remove(&id);
        for recipe in tables.recipes.values_mut().filter(|r| r.owner_id == owner.0) {
            match kind {
                LabelKind::Tag => recipe.tag_ids.retain(|t| *t != id),
                LabelKind::Ingredient => recipe.ingredient_ids.retain(|i| *i != id),
            }
        }
        Ok(())
    }

    async fn list_recipes(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.owner_id == owner.0)
            .filter(|r| filter.matches(&r.tag_ids, &r.ingredient_ids))
            .cloned()
            .collect())
    }

    async fn get_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .recipes
            .get(&id)
            .filter(|r| r.owner_id == owner.0)
            .cloned()
            .ok_or_else(|| recipe_not_found(id))
    }

    async fn create_recipe(&self, owner: UserId, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_labels(owner, LabelKind::Tag, &recipe.tag_ids)?;
        tables.check_labels(owner, LabelKind::Ingredient, &recipe.ingredient_ids)?;
        let id = tables.next_id();
        let recipe = Recipe {
            id,
            owner_id: owner.0,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image: None,
            tag_ids: recipe.tag_ids,
            ingredient_ids: recipe.ingredient_ids,
        };
        tables.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, owner: UserId, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.owned_recipe_mut(owner, id)?;
        if let Some(ids) = &changes.tag_ids {
            tables.check_labels(owner, LabelKind::Tag, ids)?;
        }
        if let Some(ids) = &changes.ingredient_ids {
            tables.check_labels(owner, LabelKind::Ingredient, ids)?;
        }
        let recipe = tables.owned_recipe_mut(owner, id)?;
        changes.apply_to(recipe);
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.owned_recipe_mut(owner, id)?;
        tables.recipes.remove(&id).ok_or_else(|| recipe_not_found(id))
    }

    async fn set_recipe_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), DatabaseError> {
        let mut tables = self.tables.write().await;
        let recipe = tables.owned_recipe_mut(owner, id)?;
        let previous = std::mem::replace(&mut recipe.image, image);
        Ok((recipe.clone(), previous))
    }
}
