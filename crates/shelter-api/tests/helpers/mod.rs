//! Shared test helpers for HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use shelter_api::{AppState, build_app};
use shelter_auth::password::legacy;
use shelter_auth::{MemoryCredentialStore, PasswordHasher, TokenCodec};
use shelter_core::config::{AppConfig, AuthConfig};
use shelter_entity::identity::{Identity, Role};

pub const SECRET: &str = "integration-secret-integration-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemoryCredentialStore,
    /// Token codec sharing the server's key
    pub codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
}

impl TestApp {
    /// Create a new test application with the built-in route table
    pub fn new() -> Self {
        let mut auth = AuthConfig::with_secret(SECRET);
        auth.argon2_memory_kib = 1024;
        auth.argon2_iterations = 1;
        auth.refresh_grace_minutes = 30;
        Self::with_auth(auth)
    }

    /// Create a new test application with custom auth settings
    pub fn with_auth(auth: AuthConfig) -> Self {
        let hasher = PasswordHasher::new(&auth).expect("Failed to build hasher");
        let config = AppConfig {
            server: Default::default(),
            database: Default::default(),
            auth,
            logging: Default::default(),
        };
        let store = MemoryCredentialStore::new();
        let state = AppState::new(config, Arc::new(store.clone())).expect("Failed to build state");
        let codec = Arc::clone(&state.codec);

        Self {
            router: build_app(state),
            store,
            codec,
            hasher,
        }
    }

    /// Add an identity with a current-scheme hash
    pub async fn add(&self, email: &str, username: &str, password: &str, role: Role) -> Uuid {
        let hash = self.hasher.hash(password).expect("Failed to hash");
        self.insert(email, username, hash, role).await
    }

    /// Add an identity with an untagged legacy hash
    pub async fn add_legacy(&self, email: &str, username: &str, password: &str, role: Role) -> Uuid {
        self.insert(email, username, legacy::encode(password, [5; 8]), role)
            .await
    }

    async fn insert(&self, email: &str, username: &str, password_hash: String, role: Role) -> Uuid {
        let subject_id = Uuid::new_v4();
        self.store
            .insert(Identity {
                subject_id,
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
                role,
            })
            .await
            .expect("Failed to insert identity");
        subject_id
    }

    /// Sign in and return the bearer token
    pub async fn signin(&self, identifier: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/signin",
                Some(serde_json::json!({ "identifier": identifier, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        self.send(req, body).await
    }

    /// Send a request with a raw Authorization header value
    pub async fn request_with_header(&self, method: &str, path: &str, authorization: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Authorization", authorization);
        self.send(req, None).await
    }

    async fn send(&self, req: http::request::Builder, body: Option<Value>) -> TestResponse {
        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&body).expect("Failed to serialize body"),
                )),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
}
