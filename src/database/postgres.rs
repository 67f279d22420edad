use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::filter::{LabelFilter, RecipeFilter};
use crate::types::UserId;

use super::manager::DatabaseError;
use super::models::{Label, LabelKind, NewRecipe, NewUser, Recipe, RecipeChanges, User, UserChanges};
use super::store::{label_not_found, recipe_not_found, Store};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, created_at";

// Association ids are aggregated per row so one recipe is one result row.
const RECIPE_SELECT: &str = r#"
    SELECT
        r.id, r.owner_id, r.title, r.time_minutes, r.price, r.link, r.image,
        ARRAY(SELECT rt.tag_id FROM recipe_tags rt WHERE rt.recipe_id = r.id ORDER BY rt.tag_id) AS tag_ids,
        ARRAY(SELECT ri.ingredient_id FROM recipe_ingredients ri WHERE ri.recipe_id = r.id ORDER BY ri.ingredient_id) AS ingredient_ids
    FROM recipes r
"#;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_recipe(conn: &mut PgConnection, owner: UserId, id: i64) -> Result<Recipe, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(RECIPE_SELECT);
        qb.push(" WHERE r.owner_id = ").push_bind(owner.0);
        qb.push(" AND r.id = ").push_bind(id);
        qb.build_query_as::<Recipe>()
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| recipe_not_found(id))
    }

    /// Replace the recipe's links of one kind. Only labels owned by `owner` are
    /// linked; any id that matched no row fails the whole transaction.
    async fn replace_links(
        conn: &mut PgConnection,
        owner: UserId,
        recipe_id: i64,
        kind: LabelKind,
        ids: &[i64],
    ) -> Result<(), DatabaseError> {
        let delete = format!("DELETE FROM {} WHERE recipe_id = $1", kind.link_table());
        sqlx::query(&delete).bind(recipe_id).execute(&mut *conn).await?;

        if ids.is_empty() {
            return Ok(());
        }

        let mut wanted = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let insert = format!(
            "INSERT INTO {link} (recipe_id, {column}) SELECT $1, l.id FROM {table} l WHERE l.owner_id = $2 AND l.id = ANY($3) RETURNING {column}",
            link = kind.link_table(),
            column = kind.link_column(),
            table = kind.table()
        );
        let linked: Vec<i64> = sqlx::query_scalar(&insert)
            .bind(recipe_id)
            .bind(owner.0)
            .bind(&wanted)
            .fetch_all(&mut *conn)
            .await?;

        if linked.len() != wanted.len() {
            let missing = wanted.iter().copied().find(|id| !linked.contains(id)).unwrap_or_default();
            return Err(DatabaseError::UnknownLabel { kind, id: missing });
        }
        Ok(())
    }

    fn push_recipe_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RecipeFilter) {
        for (kind, ids) in [(LabelKind::Tag, &filter.tags), (LabelKind::Ingredient, &filter.ingredients)] {
            if let Some(ids) = ids {
                // EXISTS keeps a recipe matching several ids to a single row
                qb.push(format!(
                    " AND EXISTS (SELECT 1 FROM {table} l WHERE l.recipe_id = r.id AND l.{column} = ANY(",
                    table = kind.link_table(),
                    column = kind.link_column()
                ));
                qb.push_bind(ids.clone());
                qb.push("))");
            }
        }
    }
}

fn map_unique_email(err: sqlx::Error, email: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::DuplicateEmail(email.to_string()),
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_email(e, &user.email))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id.0).fetch_optional(&self.pool).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET name = COALESCE($2, name), password_hash = COALESCE($3, password_hash)
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id.0)
            .bind(changes.name)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
    }

    async fn list_labels(&self, owner: UserId, kind: LabelKind, filter: LabelFilter) -> Result<Vec<Label>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT l.id, l.owner_id, l.name FROM {} l", kind.table()));
        qb.push(" WHERE l.owner_id = ").push_bind(owner.0);
        if filter.assigned_only {
            qb.push(format!(
                " AND EXISTS (SELECT 1 FROM {} x WHERE x.{} = l.id)",
                kind.link_table(),
                kind.link_column()
            ));
        }
        qb.push(" ORDER BY l.name DESC, l.id DESC");
        Ok(qb.build_query_as::<Label>().fetch_all(&self.pool).await?)
    }

    async fn labels_by_ids(&self, owner: UserId, kind: LabelKind, ids: &[i64]) -> Result<Vec<Label>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT id, owner_id, name FROM {} WHERE owner_id = $1 AND id = ANY($2) ORDER BY id",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Label>(&sql).bind(owner.0).bind(ids).fetch_all(&self.pool).await?)
    }

    async fn get_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<Label, DatabaseError> {
        let sql = format!("SELECT id, owner_id, name FROM {} WHERE owner_id = $1 AND id = $2", kind.table());
        sqlx::query_as::<_, Label>(&sql)
            .bind(owner.0)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| label_not_found(kind, id))
    }

    async fn create_label(&self, owner: UserId, kind: LabelKind, name: String) -> Result<Label, DatabaseError> {
        let sql = format!("INSERT INTO {} (owner_id, name) VALUES ($1, $2) RETURNING id, owner_id, name", kind.table());
        Ok(sqlx::query_as::<_, Label>(&sql).bind(owner.0).bind(name).fetch_one(&self.pool).await?)
    }

    async fn rename_label(&self, owner: UserId, kind: LabelKind, id: i64, name: String) -> Result<Label, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET name = $3 WHERE owner_id = $1 AND id = $2 RETURNING id, owner_id, name",
            kind.table()
        );
        sqlx::query_as::<_, Label>(&sql)
            .bind(owner.0)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| label_not_found(kind, id))
    }

    async fn delete_label(&self, owner: UserId, kind: LabelKind, id: i64) -> Result<(), DatabaseError> {
        // Association rows go with it via ON DELETE CASCADE
        let sql = format!("DELETE FROM {} WHERE owner_id = $1 AND id = $2", kind.table());
        let result = sqlx::query(&sql).bind(owner.0).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(label_not_found(kind, id));
        }
        Ok(())
    }

    async fn list_recipes(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(RECIPE_SELECT);
        qb.push(" WHERE r.owner_id = ").push_bind(owner.0);
        Self::push_recipe_filter(&mut qb, filter);
        qb.push(" ORDER BY r.id DESC");
        Ok(qb.build_query_as::<Recipe>().fetch_all(&self.pool).await?)
    }

    async fn get_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_recipe(&mut conn, owner, id).await
    }

    async fn create_recipe(&self, owner: UserId, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO recipes (owner_id, title, time_minutes, price, link) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(owner.0)
        .bind(&recipe.title)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.link)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_links(&mut tx, owner, id, LabelKind::Tag, &recipe.tag_ids).await?;
        Self::replace_links(&mut tx, owner, id, LabelKind::Ingredient, &recipe.ingredient_ids).await?;

        let created = Self::fetch_recipe(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_recipe(&self, owner: UserId, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut recipe = Self::fetch_recipe(&mut tx, owner, id).await?;

        let relink_tags = changes.tag_ids.is_some();
        let relink_ingredients = changes.ingredient_ids.is_some();
        changes.apply_to(&mut recipe);

        sqlx::query("UPDATE recipes SET title = $3, time_minutes = $4, price = $5, link = $6 WHERE owner_id = $1 AND id = $2")
            .bind(owner.0)
            .bind(id)
            .bind(&recipe.title)
            .bind(recipe.time_minutes)
            .bind(recipe.price)
            .bind(&recipe.link)
            .execute(&mut *tx)
            .await?;

        if relink_tags {
            Self::replace_links(&mut tx, owner, id, LabelKind::Tag, &recipe.tag_ids).await?;
        }
        if relink_ingredients {
            Self::replace_links(&mut tx, owner, id, LabelKind::Ingredient, &recipe.ingredient_ids).await?;
        }

        let updated = Self::fetch_recipe(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_recipe(&self, owner: UserId, id: i64) -> Result<Recipe, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let recipe = Self::fetch_recipe(&mut tx, owner, id).await?;
        sqlx::query("DELETE FROM recipes WHERE owner_id = $1 AND id = $2")
            .bind(owner.0)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn set_recipe_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> Result<(Recipe, Option<String>), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        // Row lock so concurrent uploads each see the path they replace
        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT image FROM recipes WHERE owner_id = $1 AND id = $2 FOR UPDATE")
                .bind(owner.0)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or_else(|| recipe_not_found(id))?;

        sqlx::query("UPDATE recipes SET image = $3 WHERE owner_id = $1 AND id = $2")
            .bind(owner.0)
            .bind(id)
            .bind(image)
            .execute(&mut *tx)
            .await?;

        let updated = Self::fetch_recipe(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok((updated, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_filter_uses_exists_per_parameter() {
        let mut qb = QueryBuilder::<Postgres>::new(RECIPE_SELECT);
        qb.push(" WHERE r.owner_id = ").push_bind(1_i64);
        let filter = RecipeFilter { tags: Some(vec![1, 2]), ingredients: Some(vec![3]) };
        PgStore::push_recipe_filter(&mut qb, &filter);
        let sql = qb.sql();

        assert!(sql.contains("EXISTS (SELECT 1 FROM recipe_tags l WHERE l.recipe_id = r.id AND l.tag_id = ANY($2))"));
        assert!(sql.contains(
            "EXISTS (SELECT 1 FROM recipe_ingredients l WHERE l.recipe_id = r.id AND l.ingredient_id = ANY($3))"
        ));
    }

    #[test]
    fn empty_filter_adds_no_conditions() {
        let mut qb = QueryBuilder::<Postgres>::new(RECIPE_SELECT);
        qb.push(" WHERE r.owner_id = ").push_bind(1_i64);
        PgStore::push_recipe_filter(&mut qb, &RecipeFilter::default());
        assert!(!qb.sql().contains("EXISTS"));
    }
}
