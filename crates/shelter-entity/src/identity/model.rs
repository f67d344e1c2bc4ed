//! Identity entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// The unified credential record used for login, whatever the principal kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Stable subject identifier.
    pub subject_id: Uuid,
    /// Email address, stored lowercase.
    pub email: String,
    /// Username, case-sensitive.
    pub username: String,
    /// Scheme-tagged password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role of the owning principal.
    pub role: Role,
}

/// Credential fields to rewrite on an identity. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialUpdate {
    /// New lowercase email.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New scheme-tagged password hash.
    pub password_hash: Option<String>,
}

impl CredentialUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.password_hash.is_none()
    }

    /// Applies the update to an identity in place.
    pub fn apply_to(&self, identity: &mut Identity) {
        if let Some(email) = &self.email {
            identity.email = email.clone();
        }
        if let Some(username) = &self.username {
            identity.username = username.clone();
        }
        if let Some(hash) = &self.password_hash {
            identity.password_hash = hash.clone();
        }
    }
}
