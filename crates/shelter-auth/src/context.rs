//! Per-request authenticated identity.

use serde::Serialize;
use uuid::Uuid;

use shelter_entity::identity::Role;

use crate::jwt::Claims;

/// Identity of the caller established from a verified bearer token.
///
/// Lives in the request's extensions and is dropped with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthenticatedContext {
    /// Subject of the token.
    pub subject_id: Uuid,
    /// Role carried by the token.
    pub role: Role,
}

impl AuthenticatedContext {
    /// Creates a context for the given subject and role.
    pub fn new(subject_id: Uuid, role: Role) -> Self {
        Self { subject_id, role }
    }
}

impl From<&Claims> for AuthenticatedContext {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}
