//! # shelter-database
//!
//! PostgreSQL connection management, schema migrations and the
//! [`PgCredentialStore`] backing the auth core.

pub mod connection;
pub mod credential;
pub mod migration;

pub use connection::DatabasePool;
pub use credential::PgCredentialStore;
