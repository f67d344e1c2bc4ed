//! Shelter Server: authentication core of the pet-adoption service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use shelter_auth::{CredentialStore, LegacyHashMigrator, MemoryCredentialStore};
use shelter_core::config::AppConfig;
use shelter_core::AppResult;
use shelter_database::{DatabasePool, PgCredentialStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("SHELTER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Shelter v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn CredentialStore> = match &config.database.url {
        Some(_) => {
            let db = DatabasePool::connect(&config.database).await?;
            shelter_database::migration::run_schema_migrations(db.pool()).await?;
            Arc::new(PgCredentialStore::new(db.pool().clone()))
        }
        None => {
            tracing::warn!("database.url is not set; using the in-memory credential store");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    if config.auth.migrate_legacy_hashes {
        LegacyHashMigrator::new(Arc::clone(&store)).run().await?;
    } else {
        tracing::info!("Legacy hash migration disabled");
    }

    shelter_api::run_server(config, store).await
}
