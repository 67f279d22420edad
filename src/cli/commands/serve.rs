use anyhow::Context;

use crate::config::config;
use crate::database::DatabaseManager;
use crate::media::MediaStorage;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting recipe API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if crate::is_production!() && config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set in production");
    }

    let store = DatabaseManager::store(&config.database).await?;
    let media = MediaStorage::from_config(&config.media);
    tokio::fs::create_dir_all(media.root())
        .await
        .with_context(|| format!("failed to create media root {}", media.root().display()))?;

    let app = crate::app(AppState::new(store, media));

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Recipe API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
