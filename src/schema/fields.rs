//! Field-level parsing of JSON write payloads.
//!
//! Each helper reads one field, records a message in [`FieldErrors`] when the
//! value is unusable, and returns `None` for absent or invalid fields so a
//! single request reports every bad field at once.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ApiError;

pub const MAX_TEXT_LENGTH: usize = 255;

/// Whether absent fields are an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: required fields must be present
    Create,
    /// PUT: required fields must be present, optional ones keep their value
    Replace,
    /// PATCH: nothing is required
    Partial,
}

impl WriteMode {
    fn requires(self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid field values", Some(self.0)))
        }
    }
}

pub fn object(payload: &Value) -> Result<&Map<String, Value>, ApiError> {
    payload
        .as_object()
        .ok_or_else(|| ApiError::invalid_json(format!("Expected a JSON object but got {}", type_name(payload))))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Present, non-null value of `field`; reports required/null problems.
fn present<'a>(
    map: &'a Map<String, Value>,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match map.get(field) {
        None => {
            if required {
                errors.add(field, "This field is required.");
            }
            None
        }
        Some(Value::Null) => {
            errors.add(field, "This field may not be null.");
            None
        }
        Some(value) => Some(value),
    }
}

/// Bounded text. `allow_blank` admits the empty string (optional columns such as `link`).
pub fn text(
    map: &Map<String, Value>,
    field: &str,
    mode: WriteMode,
    allow_blank: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = present(map, field, mode.requires(), errors)?;
    let Some(s) = value.as_str() else {
        errors.add(field, "Not a valid string.");
        return None;
    };
    let s = s.trim();
    if s.is_empty() && !allow_blank {
        errors.add(field, "This field may not be blank.");
        return None;
    }
    if s.chars().count() > MAX_TEXT_LENGTH {
        errors.add(field, format!("Ensure this field has no more than {} characters.", MAX_TEXT_LENGTH));
        return None;
    }
    Some(s.to_string())
}

/// Secret text: kept verbatim (no trimming), still required non-blank.
pub fn password(map: &Map<String, Value>, field: &str, mode: WriteMode, errors: &mut FieldErrors) -> Option<String> {
    let value = present(map, field, mode.requires(), errors)?;
    match value.as_str() {
        Some("") => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Some(s) => Some(s.to_string()),
        None => {
            errors.add(field, "Not a valid string.");
            None
        }
    }
}

/// Integer ≥ 0 given as a JSON number or a numeric string
pub fn non_negative_int(
    map: &Map<String, Value>,
    field: &str,
    mode: WriteMode,
    errors: &mut FieldErrors,
) -> Option<i32> {
    let value = present(map, field, mode.requires(), errors)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(n) = parsed.and_then(|n| i32::try_from(n).ok()) else {
        errors.add(field, "A valid integer is required.");
        return None;
    };
    if n < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    Some(n)
}

/// Non-negative money amount with at most 5 digits, 2 after the point.
/// Returned with exactly two decimal places.
pub fn price(map: &Map<String, Value>, field: &str, mode: WriteMode, errors: &mut FieldErrors) -> Option<Decimal> {
    let value = present(map, field, mode.requires(), errors)?;
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    let Some(amount) = parsed else {
        errors.add(field, "A valid number is required.");
        return None;
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    if amount.normalize().scale() > 2 {
        errors.add(field, "Ensure that there are no more than 2 decimal places.");
        return None;
    }
    if amount >= Decimal::new(1000, 0) {
        errors.add(field, "Ensure that there are no more than 5 digits in total.");
        return None;
    }
    let mut amount = amount.abs();
    amount.rescale(2);
    Some(amount)
}

/// List of primary keys; sorted and deduplicated. `None` when absent.
pub fn id_list(map: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<Vec<i64>> {
    let value = present(map, field, false, errors)?;
    let Some(items) = value.as_array() else {
        errors.add(field, format!("Expected a list of items but got type \"{}\".", type_name(value)));
        return None;
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match id {
            Some(id) => ids.push(id),
            None => {
                errors.add(field, format!("Incorrect type. Expected pk value, received {}.", type_name(item)));
                return None;
            }
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Some(ids)
}
