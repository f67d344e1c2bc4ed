//! Credential store boundary.
//!
//! The auth core never talks to a database directly; it consumes a
//! [`CredentialStore`] that resolves login identifiers against one unified
//! view of all principal kinds and writes back password hashes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use shelter_entity::identity::{CredentialUpdate, Identity, LoginIdentifier};

pub use memory::MemoryCredentialStore;

/// Errors returned by a credential store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or failed the query.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// No identity with the given subject id.
    #[error("identity not found")]
    NotFound,
    /// A uniqueness constraint would be violated.
    #[error("{0}")]
    Conflict(String),
    /// Stored data breaks a store invariant, such as one identifier
    /// resolving to several principals.
    #[error("inconsistent store: {0}")]
    Inconsistent(String),
}

/// Read/write access to login identities across all principal kinds.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Resolves a normalized identifier with a single unified lookup.
    ///
    /// Emails match the lowercase email column; usernames match exactly.
    async fn find_by_login_identifier(
        &self,
        identifier: &LoginIdentifier,
    ) -> Result<Option<Identity>, StoreError>;

    /// Replaces the stored password hash of one identity.
    async fn save_secret_hash(&self, subject_id: Uuid, password_hash: &str)
    -> Result<(), StoreError>;

    /// Returns every identity. Used by the startup migration pass.
    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError>;

    /// Rewrites credential fields of one identity.
    async fn update_credentials(
        &self,
        subject_id: Uuid,
        update: &CredentialUpdate,
    ) -> Result<(), StoreError>;
}
