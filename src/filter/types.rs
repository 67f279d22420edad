use serde::{Deserialize, Serialize};

/// Raw query string of `GET /api/recipe/recipes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids, e.g. `tags=1,4`
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// Raw query string of the tag and ingredient list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelListQuery {
    pub assigned_only: Option<String>,
}

/// Parsed recipe restriction. `None` on either side means "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelFilter {
    pub assigned_only: bool,
}
