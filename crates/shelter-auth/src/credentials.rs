//! Credential updates for an authenticated identity.
//!
//! Only email, username and password can be changed here. Uniqueness is
//! checked across every principal kind through the unified lookup before the
//! write; the store enforces it again at write time.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use shelter_entity::identity::{CredentialUpdate, LoginIdentifier};

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::store::CredentialStore;

/// Requested credential changes. Absent fields are left alone.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialPatch {
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
    /// New username.
    #[serde(default)]
    pub username: Option<String>,
    /// New plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Applies [`CredentialPatch`]es to stored identities.
#[derive(Clone)]
pub struct CredentialMerger {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
}

impl std::fmt::Debug for CredentialPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPatch")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl std::fmt::Debug for CredentialMerger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialMerger").finish()
    }
}

impl CredentialMerger {
    /// Creates a merger over `store`.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Validates, checks uniqueness, hashes and writes the patch.
    pub async fn apply(&self, subject_id: Uuid, patch: CredentialPatch) -> Result<(), AuthError> {
        let email = patch.email.map(|e| e.trim().to_lowercase());
        let username = patch.username.map(|u| u.trim().to_string());

        if email.is_none() && username.is_none() && patch.password.is_none() {
            return Err(AuthError::Validation("Nothing to update".to_string()));
        }
        if let Some(email) = &email {
            if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
                return Err(AuthError::Validation("Invalid email address".to_string()));
            }
            self.ensure_available(subject_id, LoginIdentifier::Email(email.clone()), "Email")
                .await?;
        }
        if let Some(username) = &username {
            if username.is_empty() || username.contains('@') {
                return Err(AuthError::Validation("Invalid username".to_string()));
            }
            self.ensure_available(
                subject_id,
                LoginIdentifier::Username(username.clone()),
                "Username",
            )
            .await?;
        }

        let password_hash = match patch.password.as_deref() {
            Some("") => return Err(AuthError::Validation("Password must not be empty".to_string())),
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let update = CredentialUpdate {
            email,
            username,
            password_hash,
        };
        self.store.update_credentials(subject_id, &update).await?;

        info!(
            subject_id = %subject_id,
            email = update.email.is_some(),
            username = update.username.is_some(),
            password = update.password_hash.is_some(),
            "Credentials updated"
        );
        Ok(())
    }

    async fn ensure_available(
        &self,
        subject_id: Uuid,
        identifier: LoginIdentifier,
        field: &str,
    ) -> Result<(), AuthError> {
        match self.store.find_by_login_identifier(&identifier).await? {
            Some(owner) if owner.subject_id != subject_id => {
                Err(AuthError::Conflict(format!("{field} already in use")))
            }
            _ => Ok(()),
        }
    }
}
