//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, minting identity tokens,
//! and making HTTP requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use band_api::{create_app, create_app_state};
use band_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, IdentityClaims,
    IdentityConfig, IdentityVerifier, RateLimitConfig, ServerConfig, SnowflakeConfig,
};
use band_core::SnowflakeGenerator;
use band_db::MemoryDatabase;
use band_service::{ServiceContext, ServiceContextBuilder};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Secret shared between the test "identity provider" and the server
pub const TEST_JWT_SECRET: &str = "integration-identity-secret";

/// Secret expected on identity webhooks
pub const TEST_WEBHOOK_SECRET: &str = "integration-webhook-secret";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server over a fresh in-memory store
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        // Port 0: let the OS pick a free one
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authed(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::authed(self.client.get(self.url(path)), token)
            .send()
            .await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::authed(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::authed(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::authed(self.client.put(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::authed(self.client.delete(self.url(path)), token)
            .send()
            .await?)
    }

    /// Deliver an identity webhook with the given secret
    pub async fn webhook<T: Serialize>(&self, secret: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/v1/webhooks/identity"))
            .header("x-webhook-secret", secret)
            .json(body)
            .send()
            .await?)
    }
}

/// Configuration for a server over the in-memory store
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "band-manager-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: false,
        },
        identity: IdentityConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
            audience: None,
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        },
        // Tests fire requests back to back
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig::default(),
        snowflake: SnowflakeConfig { worker_id: 1 },
    }
}

/// Service context over a fresh in-memory store
pub fn memory_context() -> ServiceContext {
    let verifier = IdentityVerifier::new(TEST_JWT_SECRET, None, None);
    ServiceContextBuilder::new()
        .database(Arc::new(MemoryDatabase::new()))
        .identity_verifier(Arc::new(verifier))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(2)))
        .build()
        .expect("service context")
}

/// Sign an identity token the way the identity provider would
pub fn mint_token(claims: &IdentityClaims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its code
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("error body without code: {body}"))
}
