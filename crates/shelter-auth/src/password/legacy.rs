//! Legacy PBKDF2-HMAC-SHA256 scheme.
//!
//! Body layout: hex(`salt ‖ digest`) with an 8-byte salt, a 32-byte digest
//! and 256 iterations, as written by the previous service.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Salt length in bytes.
pub const SALT_LEN: usize = 8;
/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;
/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 256;

/// Whether `body` has the legacy layout: hex of exactly salt plus digest.
pub fn is_well_formed(body: &str) -> bool {
    body.len() == (SALT_LEN + DIGEST_LEN) * 2 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verifies `plaintext` against a legacy body. Malformed bodies never match.
pub fn verify(plaintext: &str, body: &str) -> bool {
    let Ok(decoded) = hex::decode(body) else {
        return false;
    };
    if decoded.len() != SALT_LEN + DIGEST_LEN {
        return false;
    }
    let (salt, expected) = decoded.split_at(SALT_LEN);
    let actual = derive(plaintext, salt);
    actual[..].ct_eq(expected).into()
}

/// Encodes `plaintext` in the legacy layout with the given salt.
///
/// Only needed to produce fixtures; new hashes always use the current scheme.
pub fn encode(plaintext: &str, salt: [u8; SALT_LEN]) -> String {
    let digest = derive(plaintext, &salt);
    let mut out = Vec::with_capacity(SALT_LEN + DIGEST_LEN);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&digest);
    hex::encode(out)
}

fn derive(plaintext: &str, salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(plaintext.as_bytes(), salt, ITERATIONS, &mut digest);
    digest
}
