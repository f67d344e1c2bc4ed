//! Scheme tag parsing.

use std::fmt;

use super::legacy;

/// Hash schemes understood by the hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashScheme {
    /// Argon2id PHC string. Used for every new hash.
    Argon2,
    /// PBKDF2-HMAC-SHA256, hex encoded salt and digest. Verify only.
    Pbkdf2,
}

impl HashScheme {
    /// The scheme new hashes are produced with.
    pub const CURRENT: HashScheme = HashScheme::Argon2;

    /// Tag identifier written between braces.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Argon2 => "argon2",
            Self::Pbkdf2 => "pbkdf2",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "argon2" => Some(Self::Argon2),
            "pbkdf2" => Some(Self::Pbkdf2),
            _ => None,
        }
    }

    /// Prefixes `body` with this scheme's tag.
    pub fn tagged(&self, body: &str) -> String {
        format!("{{{}}}{}", self.tag(), body)
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A stored hash split into its tag and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredHash<'a> {
    /// Known tag.
    Tagged {
        /// Scheme named by the tag.
        scheme: HashScheme,
        /// Text after the closing brace.
        body: &'a str,
    },
    /// No tag at all. Verified as legacy PBKDF2.
    Untagged(&'a str),
    /// A tag this hasher does not know.
    Unknown {
        /// The unrecognized tag.
        tag: &'a str,
    },
}

impl<'a> StoredHash<'a> {
    /// Splits a stored value on its `{tag}` prefix.
    pub fn parse(stored: &'a str) -> Self {
        let Some(rest) = stored.strip_prefix('{') else {
            return Self::Untagged(stored);
        };
        let Some(end) = rest.find('}') else {
            return Self::Untagged(stored);
        };
        let tag = &rest[..end];
        let body = &rest[end + 1..];
        match HashScheme::from_tag(tag) {
            Some(scheme) => Self::Tagged { scheme, body },
            None => Self::Unknown { tag },
        }
    }

    /// Scheme used to verify this value, if any.
    pub fn verifying_scheme(&self) -> Option<(HashScheme, &'a str)> {
        match *self {
            Self::Tagged { scheme, body } => Some((scheme, body)),
            Self::Untagged(body) => Some((HashScheme::Pbkdf2, body)),
            Self::Unknown { .. } => None,
        }
    }

    /// Migration status of this value.
    pub fn status(&self) -> HashStatus {
        match self {
            Self::Tagged { scheme, .. } if *scheme == HashScheme::CURRENT => HashStatus::Current,
            Self::Tagged { .. } => HashStatus::LegacyTagged,
            Self::Untagged(body) if legacy::is_well_formed(body) => HashStatus::LegacyUntagged,
            Self::Untagged(_) => HashStatus::Unrecognized,
            Self::Unknown { .. } => HashStatus::Unrecognized,
        }
    }
}

/// Where a stored hash stands relative to the current scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStatus {
    /// Tagged with the current scheme.
    Current,
    /// Tagged with a known older scheme.
    LegacyTagged,
    /// Carries no tag and has the legacy PBKDF2 layout.
    LegacyUntagged,
    /// Unknown tag, or untagged text that is not a legacy body.
    Unrecognized,
}
