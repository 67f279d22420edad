use serde_json::{json, Value};

use crate::auth::hash_password;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::NewUser;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::schema::UserCreate;

/// Same validation as `POST /api/user/create`, written straight to the store.
pub async fn create(email: String, name: String, password: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is not set; users created in memory would be lost");
    }
    let payload = json!({"email": email, "name": name, "password": password});
    let create = UserCreate::parse(&payload, config.security.min_password_length).map_err(describe)?;

    let password_hash = hash_password(&create.password).await?;
    let store = DatabaseManager::store(&config.database).await?;
    let user = store
        .create_user(NewUser {
            email: create.email,
            name: create.name,
            password_hash,
        })
        .await
        .map_err(|e| describe(e.into()))?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({"id": user.id, "email": user.email, "name": user.name})),
        OutputFormat::Text => println!("Created user {} <{}>", user.id, user.email),
    }
    Ok(())
}

fn describe(err: ApiError) -> anyhow::Error {
    let body: Value = err.to_json();
    match body.get("field_errors") {
        Some(fields) => anyhow::anyhow!("{}: {}", err.message(), fields),
        None => anyhow::anyhow!("{}", err.message()),
    }
}
