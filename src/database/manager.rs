use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

use super::memory::MemoryStore;
use super::models::LabelKind;
use super::postgres::PgStore;
use super::store::Store;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A referenced tag or ingredient is missing or owned by someone else
    #[error("{kind:?} {id} does not exist")]
    UnknownLabel { kind: LabelKind, id: i64 },

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the configured storage backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to Postgres when a URL is configured, otherwise fall back to the in-memory store.
    pub async fn store(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        let Some(url) = config.url.as_deref() else {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            return Ok(Arc::new(MemoryStore::new()));
        };

        let pool = Self::connect(url, config).await?;
        if config.run_migrations {
            Self::migrate(&pool).await?;
        }
        Ok(Arc::new(PgStore::new(pool)))
    }

    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;

        info!("Created database pool for: {}", Self::redacted(url));
        Ok(pool)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Connection string with the password masked, safe for logs
    fn redacted(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("****"));
                }
                parsed.into()
            }
            Err(_) => "<invalid database url>".to_string(),
        }
    }
}
