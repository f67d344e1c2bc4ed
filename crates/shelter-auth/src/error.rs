//! Authentication and authorization error taxonomy.

use thiserror::Error;

use shelter_core::error::AppError;

use crate::store::StoreError;

/// Reasons a bearer token is rejected.
///
/// All three collapse to one 401 response externally but are logged apart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The current time is at or past the token's expiry.
    #[error("token has expired")]
    Expired,
    /// The token could not be parsed.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the token contents.
    #[error("token signature is invalid")]
    BadSignature,
}

impl TokenError {
    /// Short label used as a structured log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
        }
    }
}

/// Errors raised by the auth core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login rejected. Never says whether the identifier or the secret was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Bearer token rejected.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Authenticated, but the role is not allowed.
    #[error("access denied")]
    Forbidden,
    /// An email or username is already owned by another identity.
    #[error("{0}")]
    Conflict(String),
    /// Request data cannot be applied.
    #[error("{0}")]
    Validation(String),
    /// The identity addressed by subject id does not exist.
    #[error("identity not found")]
    SubjectNotFound,
    /// The credential store failed; surfaced, never retried inline.
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),
    /// Hashing or signing failed.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::NotFound => Self::SubjectNotFound,
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Inconsistent(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::authentication("Invalid credentials"),
            AuthError::Token(_) => AppError::authentication("Authentication required"),
            AuthError::Forbidden => AppError::authorization("Access denied"),
            AuthError::Conflict(msg) => AppError::conflict(msg),
            AuthError::Validation(msg) => AppError::validation(msg),
            AuthError::SubjectNotFound => AppError::not_found("Identity not found"),
            AuthError::StoreUnavailable(_) => {
                AppError::database("Credential store unavailable")
            }
            AuthError::Internal(msg) => AppError::internal(msg),
        }
    }
}
