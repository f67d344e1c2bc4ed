//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Sign-in request body.
#[derive(Clone, Serialize, Deserialize)]
pub struct SigninRequest {
    /// Email or username.
    pub identifier: String,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for SigninRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninRequest")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The token to exchange; may be expired within the grace window.
    pub token: String,
}
