//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use shelter_auth::{
    AuthenticationGate, CredentialMerger, CredentialStore, PasswordHasher, RoutePolicy,
    TokenCodec,
};
use shelter_core::config::AppConfig;
use shelter_core::AppResult;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Everything is
/// built once at startup and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Login flow
    pub gate: Arc<AuthenticationGate>,
    /// Token signing and verification
    pub codec: Arc<TokenCodec>,
    /// Route table
    pub policy: Arc<RoutePolicy>,
    /// Credential updates
    pub merger: Arc<CredentialMerger>,
}

impl AppState {
    /// Wires the auth core around `store`.
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let codec = Arc::new(TokenCodec::new(&config.auth));
        let policy = Arc::new(RoutePolicy::from_config(&config.auth.routes)?);
        let gate = Arc::new(AuthenticationGate::new(
            Arc::clone(&store),
            Arc::clone(&hasher),
            Arc::clone(&codec),
        )?);
        let merger = Arc::new(CredentialMerger::new(store, hasher));

        tracing::info!(rules = policy.rules().len(), "Route policy loaded");

        Ok(Self {
            config: Arc::new(config),
            gate,
            codec,
            policy,
            merger,
        })
    }
}
