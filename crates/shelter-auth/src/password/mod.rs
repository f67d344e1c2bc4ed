//! Scheme-tagged password hashing.
//!
//! Stored hashes carry a `{scheme}` prefix. Argon2id is the current scheme;
//! PBKDF2-HMAC-SHA256 is accepted for verification only.

pub mod hasher;
pub mod legacy;
pub mod scheme;

pub use hasher::PasswordHasher;
pub use scheme::{HashScheme, HashStatus, StoredHash};
