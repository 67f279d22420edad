use serde::Serialize;
use serde_json::Value;

use crate::database::models::Label;
use crate::error::ApiError;

use super::fields::{self, FieldErrors, WriteMode};

/// Tag and ingredient representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRepr {
    pub id: i64,
    pub name: String,
}

impl From<Label> for LabelRepr {
    fn from(label: Label) -> Self {
        Self { id: label.id, name: label.name }
    }
}

/// Validated tag/ingredient write. `name` is `None` only for an empty PATCH.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelWrite {
    pub name: Option<String>,
}

impl LabelWrite {
    pub fn parse(payload: &Value, mode: WriteMode) -> Result<Self, ApiError> {
        let map = fields::object(payload)?;
        let mut errors = FieldErrors::default();
        let name = fields::text(map, "name", mode, false, &mut errors);
        errors.into_result()?;
        Ok(Self { name })
    }
}
