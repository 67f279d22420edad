use serde::Serialize;
use serde_json::Value;

use crate::auth::normalize_email;
use crate::database::models::User;
use crate::error::ApiError;

use super::fields::{self, FieldErrors, WriteMode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRepr {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserRepr {
    fn from(user: &User) -> Self {
        Self { email: user.email.clone(), name: user.name.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl UserCreate {
    pub fn parse(payload: &Value, min_password_length: usize) -> Result<Self, ApiError> {
        let map = fields::object(payload)?;
        let mut errors = FieldErrors::default();

        let email = email(map, &mut errors);
        let password = password(map, WriteMode::Create, min_password_length, &mut errors);
        let name = fields::text(map, "name", WriteMode::Create, false, &mut errors);

        errors.into_result()?;
        match (email, password, name) {
            (Some(email), Some(password), Some(name)) => Ok(Self { email, password, name }),
            _ => Err(ApiError::validation_error("email, password and name are required", None)),
        }
    }
}

/// `PATCH /api/user/me`; email is not writable
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn parse(payload: &Value, min_password_length: usize) -> Result<Self, ApiError> {
        let map = fields::object(payload)?;
        let mut errors = FieldErrors::default();

        let name = fields::text(map, "name", WriteMode::Partial, false, &mut errors);
        let password = password(map, WriteMode::Partial, min_password_length, &mut errors);

        errors.into_result()?;
        Ok(Self { name, password })
    }
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

impl TokenRequest {
    pub fn parse(payload: &Value) -> Result<Self, ApiError> {
        let map = fields::object(payload)?;
        let mut errors = FieldErrors::default();

        let email = fields::text(map, "email", WriteMode::Create, false, &mut errors);
        let password = fields::password(map, "password", WriteMode::Create, &mut errors);

        errors.into_result()?;
        match (email, password) {
            (Some(email), Some(password)) => Ok(Self { email: normalize_email(&email), password }),
            _ => Err(ApiError::validation_error("email and password are required", None)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRepr {
    pub token: String,
}

fn email(map: &serde_json::Map<String, Value>, errors: &mut FieldErrors) -> Option<String> {
    let email = normalize_email(&fields::text(map, "email", WriteMode::Create, false, errors)?);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.add("email", "Enter a valid email address.");
        return None;
    }
    Some(email)
}

fn password(
    map: &serde_json::Map<String, Value>,
    mode: WriteMode,
    min_length: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let password = fields::password(map, "password", mode, errors)?;
    if password.chars().count() < min_length {
        errors.add(
            "password",
            format!("Ensure this field has at least {} characters.", min_length),
        );
        return None;
    }
    Some(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_normalizes_email() {
        let create = UserCreate::parse(
            &json!({"email": "Test@EXAMPLE.com", "password": "secret1", "name": "Test"}),
            5,
        )
        .unwrap();
        assert_eq!(create.email, "Test@example.com");
        assert_eq!(create.name, "Test");
    }

    #[test]
    fn create_rejects_bad_email_and_short_password() {
        match UserCreate::parse(&json!({"email": "nope", "password": "pw", "name": "X"}), 5).unwrap_err() {
            ApiError::ValidationError { field_errors: Some(errors), .. } => {
                assert_eq!(errors["email"], "Enter a valid email address.");
                assert_eq!(errors["password"], "Ensure this field has at least 5 characters.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn update_ignores_email() {
        let update = UserUpdate::parse(&json!({"email": "x@y.z", "name": "New"}), 5).unwrap();
        assert_eq!(update.name.as_deref(), Some("New"));
        assert!(update.password.is_none());
    }

    #[test]
    fn token_request_rejects_blank_password() {
        let err = TokenRequest::parse(&json!({"email": "a@b.io", "password": ""})).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
