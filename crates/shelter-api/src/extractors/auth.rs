//! Extractor for the caller's [`AuthenticatedContext`].
//!
//! The context is put into the request extensions by the authentication
//! middleware; this only reads it back.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shelter_auth::AuthenticatedContext;
use shelter_core::error::AppError;

/// Authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub AuthenticatedContext);

impl std::ops::Deref for AuthUser {
    type Target = AuthenticatedContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Authentication required"))
    }
}
