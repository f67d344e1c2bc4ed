//! Login identifier normalization.

use std::fmt;

/// A login identifier after normalization.
///
/// Anything containing `@` is an email and is lowercased; anything else is
/// a username and keeps its case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoginIdentifier {
    /// Lowercased email address.
    Email(String),
    /// Case-sensitive username.
    Username(String),
}

impl LoginIdentifier {
    /// Normalizes a raw identifier as typed by the caller.
    pub fn normalize(raw: &str) -> Self {
        if raw.contains('@') {
            Self::Email(raw.to_lowercase())
        } else {
            Self::Username(raw.to_string())
        }
    }

    /// Returns the normalized value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(v) | Self::Username(v) => v,
        }
    }

    /// Whether this identifier is an email address.
    pub fn is_email(&self) -> bool {
        matches!(self, Self::Email(_))
    }
}

impl fmt::Display for LoginIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
