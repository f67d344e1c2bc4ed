//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum accepted length of the JWT signing secret, in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authentication and credential configuration.
///
/// Loaded once at startup; the signing key and route table built from it
/// are immutable for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Has no default.
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// How long after expiry a token may still be exchanged via refresh.
    #[serde(default = "default_refresh_grace")]
    pub refresh_grace_minutes: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 lane count.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Run the legacy hash migration pass before accepting traffic.
    #[serde(default = "default_true")]
    pub migrate_legacy_hashes: bool,
    /// Route policy table. Empty means the built-in table.
    #[serde(default)]
    pub routes: Vec<RouteRuleConfig>,
}

/// One route policy entry as written in configuration.
///
/// ```toml
/// [[auth.routes]]
/// method = "GET"
/// pattern = "/api/v1/adocoes"
/// roles = ["ADMIN"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteRuleConfig {
    /// HTTP method; absent matches any method.
    #[serde(default)]
    pub method: Option<String>,
    /// Path pattern (`{var}`, `*` and trailing `**` supported).
    pub pattern: String,
    /// `"public"`, `"authenticated"` or `"deny_all"`. Ignored when `roles` is set.
    #[serde(default)]
    pub access: Option<String>,
    /// Roles allowed on this route.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthConfig {
    /// Rejects configurations that cannot produce a safe signing key.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LENGTH} bytes"
            )));
        }
        if self.jwt_access_ttl_minutes == 0 {
            return Err(AppError::configuration(
                "auth.jwt_access_ttl_minutes must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Builds a configuration around `secret` with every other field defaulted.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            jwt_access_ttl_minutes: default_access_ttl(),
            refresh_grace_minutes: default_refresh_grace(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            migrate_legacy_hashes: default_true(),
            routes: Vec::new(),
        }
    }
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_grace() -> u64 {
    60
}

fn default_argon2_memory() -> u32 {
    19_456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
