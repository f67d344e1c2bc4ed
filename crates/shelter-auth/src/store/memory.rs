//! In-memory credential store for single-node development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shelter_entity::identity::{CredentialUpdate, Identity, LoginIdentifier};

use super::{CredentialStore, StoreError};

/// Credential store backed by a map guarded by a Tokio read/write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    identities: Arc<RwLock<HashMap<Uuid, Identity>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity, enforcing global email and username uniqueness.
    pub async fn insert(&self, mut identity: Identity) -> Result<(), StoreError> {
        identity.email = identity.email.to_lowercase();
        let mut identities = self.identities.write().await;
        check_unique(
            &identities,
            identity.subject_id,
            Some(&identity.email),
            Some(&identity.username),
        )?;
        identities.insert(identity.subject_id, identity);
        Ok(())
    }

    /// Returns a copy of the identity with the given subject id.
    pub async fn get(&self, subject_id: Uuid) -> Option<Identity> {
        self.identities.read().await.get(&subject_id).cloned()
    }

    /// Number of stored identities.
    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    /// Whether the store holds no identities.
    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

fn check_unique(
    identities: &HashMap<Uuid, Identity>,
    owner: Uuid,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<(), StoreError> {
    for other in identities.values().filter(|i| i.subject_id != owner) {
        if email.is_some_and(|e| other.email == e) {
            return Err(StoreError::Conflict("Email already in use".to_string()));
        }
        if username.is_some_and(|u| other.username == u) {
            return Err(StoreError::Conflict("Username already in use".to_string()));
        }
    }
    Ok(())
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_login_identifier(
        &self,
        identifier: &LoginIdentifier,
    ) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.read().await;
        let found = identities.values().find(|i| match identifier {
            LoginIdentifier::Email(email) => i.email == *email,
            LoginIdentifier::Username(username) => i.username == *username,
        });
        Ok(found.cloned())
    }

    async fn save_secret_hash(
        &self,
        subject_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities.get_mut(&subject_id).ok_or(StoreError::NotFound)?;
        identity.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let identities = self.identities.read().await;
        let mut all: Vec<Identity> = identities.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }

    async fn update_credentials(
        &self,
        subject_id: Uuid,
        update: &CredentialUpdate,
    ) -> Result<(), StoreError> {
        let mut identities = self.identities.write().await;
        if !identities.contains_key(&subject_id) {
            return Err(StoreError::NotFound);
        }
        check_unique(
            &identities,
            subject_id,
            update.email.as_deref(),
            update.username.as_deref(),
        )?;
        if let Some(identity) = identities.get_mut(&subject_id) {
            update.apply_to(identity);
        }
        Ok(())
    }
}
