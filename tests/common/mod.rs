#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use recipe_api::database::{MemoryStore, Store};
use recipe_api::media::MediaStorage;
use recipe_api::state::AppState;

/// Router served on a free port inside the current test runtime,
/// backed by the given store (in-memory by default) and a scratch media directory.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub media: TempDir,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn Store>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let media = tempfile::tempdir()?;
        let state = AppState::new(store, MediaStorage::new(media.path(), "/media"));
        let app = recipe_api::app(state);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            client: Client::new(),
            media,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn patch(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token).json(&body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user and return a bearer token for them
    pub async fn register(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/user/create"))
            .json(&json!({"email": email, "password": password, "name": "Test User"}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create user failed: {}", res.status());

        let res = self
            .client
            .post(self.url("/api/user/token"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "token request failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from response")
    }

    /// POST a label and return its id
    pub async fn create_label(&self, token: &str, kind: &str, name: &str) -> Result<i64> {
        let res = self
            .post(&format!("/api/recipe/{}", kind), token, json!({ "name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create {} failed: {}", kind, res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("label id missing")
    }

    /// POST a recipe with the given extra fields and return its id
    pub async fn create_recipe(&self, token: &str, title: &str, extra: Value) -> Result<i64> {
        let mut payload = json!({"title": title, "time_minutes": 10, "price": "5.00"});
        if let (Some(map), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            map.extend(extra.clone());
        }
        let res = self.post("/api/recipe/recipes", token, payload).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create recipe failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("recipe id missing")
    }
}

/// Ids of the recipes in a list response, in response order
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}
