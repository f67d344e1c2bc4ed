//! Principal role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles carried by every login identity.
///
/// Each role corresponds to one principal kind: an adopting end-user,
/// an organization (ONG) that shelters animals, or an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// End-user who adopts animals.
    User,
    /// Organization that registers animals and adoptions.
    Ong,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 3] = [Role::User, Role::Ong, Role::Admin];

    /// Return the role as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Ong => "ONG",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = shelter_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().trim_start_matches("ROLE_") {
            "USER" => Ok(Self::User),
            "ONG" => Ok(Self::Ong),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(shelter_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: USER, ONG, ADMIN"
            ))),
        }
    }
}
