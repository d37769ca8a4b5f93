//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and making HTTP requests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use useg_api::server::create_app_state_with;
use useg_api::{create_app, create_app_state};
use useg_common::AppConfig;
use useg_db::InMemoryStore;
use useg_service::ServiceContext;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    /// Backing store when the server runs in memory
    pub store: Option<InMemoryStore>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a test server backed by a fresh in-memory store
    pub async fn start() -> Result<Self> {
        let store = InMemoryStore::new();
        let ctx = ServiceContext::from_store(store.clone());
        let app = create_app(create_app_state_with(ctx, memory_config()?));

        let mut server = Self::serve(app).await?;
        server.store = Some(store);
        Ok(server)
    }

    /// Start a test server against the PostgreSQL database in `DATABASE_URL`
    pub async fn start_postgres() -> Result<Self> {
        let config = test_config()?;
        let state = create_app_state(config).await?;
        Self::serve(create_app(state)).await
    }

    async fn serve(app: Router) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Create HTTP client
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            store: None,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Send a request with a JSON body
    pub async fn send<T: Serialize>(&self, method: Method, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.request(method, &url).json(body).send().await?)
    }

    /// Make a GET request without a body
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with JSON body
    pub async fn get_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        self.send(Method::GET, path, body).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        self.send(Method::POST, path, body).await
    }

    /// Make a DELETE request with JSON body
    pub async fn delete<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        self.send(Method::DELETE, path, body).await
    }
}

/// Configuration for an in-memory server; the database URL is never dialed
pub fn memory_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused@localhost/useg".to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })?;
    Ok(config)
}

/// Create a test configuration from the environment
pub fn test_config() -> Result<AppConfig> {
    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config.database.migrations_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../migrations").to_string();
    Ok(config)
}

/// Helper to check if a database is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status and return the plain-text body
pub async fn assert_text(response: Response, expected_status: StatusCode) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(body)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    assert_text(response, expected_status).await.map(|_| ())
}
