#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use plots_api::app::{router, AppState};
use plots_api::auth::hash_password;
use plots_api::config::AppConfig;
use plots_api::database::{InMemoryPlotStore, InMemoryUserDirectory, Page, PlotStore};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const USER1: (&str, &str) = ("user1", "password_1234");
pub const USER2: (&str, &str) = ("user2", "password_abcd");

/// Unit square-ish ring used across the suite
pub const RING: &str = "((0 0, 0.1 0, 0.1 0.1, 0 0.1, 0 0))";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<InMemoryPlotStore>,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Result<Self> {
        let users = Arc::new(InMemoryUserDirectory::new());
        users.insert(USER1.0, &hash_password(USER1.1)?).await;
        users.insert(USER2.0, &hash_password(USER2.1)?).await;
        let store = Arc::new(InMemoryPlotStore::with_users(users.clone()));

        let state = AppState::new(config, store.clone(), users)?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router(state)).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            store,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
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

    /// POST /plots/ as user1 and return the new id
    pub async fn create_plot(&self, name: &str, owner: &str) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/plots/"))
            .json(&json!({ "plot_name": name, "plot_geometry": RING, "plot_owner": owner }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("response carried no id")
    }

    pub async fn plot_count(&self) -> Result<i64> {
        Ok(self.store.count().await?)
    }

    pub async fn plots_of(&self, owner: &str) -> Result<Vec<plots_api::database::models::Plot>> {
        Ok(self.store.list_by_owner(owner, Page::all()).await?)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

/// A server with user1 and user2 registered and no plots
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(test_config()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let server = TestServer::spawn(config).await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}
