//! Bearer token issuance, verification and refresh.

pub mod claims;
pub mod decoder;
pub mod encoder;

use chrono::{DateTime, Duration, Utc};

use shelter_core::config::AuthConfig;
use shelter_entity::identity::Role;
use uuid::Uuid;

use crate::error::{AuthError, TokenError};

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder};

/// Issues and verifies HS256 tokens with a key fixed at construction.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    /// How long past expiry a token may still be refreshed.
    refresh_grace: Duration,
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            refresh_grace: Duration::minutes(config.refresh_grace_minutes as i64),
        }
    }

    /// Issues a token for `subject` valid from now.
    pub fn issue(&self, subject: Uuid, role: Role) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        self.encoder.encode(subject, role, now)
    }

    /// Verifies a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature and expiry as of `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.decoder.decode(token)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Re-issues a token for the same subject and role.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        self.refresh_at(token, Utc::now())
    }

    /// Re-issues a token if it is signed by us and `now` is before its
    /// expiry plus the grace window; otherwise fails with `Expired`.
    pub fn refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = self.decoder.decode(token)?;
        let deadline = claims.exp + self.refresh_grace.num_seconds();
        if now.timestamp() >= deadline {
            return Err(TokenError::Expired.into());
        }
        self.issue_at(claims.sub, claims.role, now)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    fn codec() -> TokenCodec {
        let mut config = AuthConfig::with_secret("0123456789abcdef0123456789abcdef");
        config.jwt_access_ttl_minutes = 60;
        config.refresh_grace_minutes = 30;
        TokenCodec::new(&config)
    }

    fn flip_signature_bit(token: &str, bit: usize) -> String {
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(sig).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        format!("{head}.{}", URL_SAFE_NO_PAD.encode(bytes))
    }

    #[test]
    fn test_issue_verify() {
        let codec = codec();
        let subject = Uuid::new_v4();
        let issued = codec.issue(subject, Role::Ong).unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, Role::Ong);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expired_at_and_after_exp() {
        let codec = codec();
        let now = Utc::now();
        let issued = codec.issue_at(Uuid::new_v4(), Role::User, now).unwrap();

        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(codec.verify_at(&issued.token, just_before).is_ok());
        assert_eq!(
            codec.verify_at(&issued.token, issued.expires_at).unwrap_err(),
            TokenError::Expired
        );
        assert_eq!(
            codec
                .verify_at(&issued.token, now + Duration::days(3))
                .unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_any_flipped_signature_bit_is_bad_signature() {
        let codec = codec();
        let issued = codec.issue(Uuid::new_v4(), Role::Admin).unwrap();
        for bit in [0, 7, 8, 100, 255] {
            let tampered = flip_signature_bit(&issued.token, bit);
            assert_eq!(
                codec.verify(&tampered).unwrap_err(),
                TokenError::BadSignature,
                "bit {bit}"
            );
        }
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let codec = codec();
        let issued = codec.issue(Uuid::new_v4(), Role::User).unwrap();
        let mut parts: Vec<String> = issued.token.split('.').map(String::from).collect();
        let payload = URL_SAFE_NO_PAD.decode(&parts[1]).unwrap();
        let forged = String::from_utf8(payload).unwrap().replace("USER", "ADMIN");
        parts[1] = URL_SAFE_NO_PAD.encode(forged);
        assert_eq!(
            codec.verify(&parts.join(".")).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec();
        for token in ["", "abc", "a.b", "a.b.c", "not a token at all"] {
            assert_eq!(codec.verify(token).unwrap_err(), TokenError::Malformed, "{token:?}");
        }
    }

    #[test]
    fn test_other_key_is_bad_signature() {
        let other = TokenCodec::new(&AuthConfig::with_secret(
            "ffffffffffffffffffffffffffffffff",
        ));
        let issued = other.issue(Uuid::new_v4(), Role::User).unwrap();
        assert_eq!(
            codec().verify(&issued.token).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_refresh_within_grace() {
        let codec = codec();
        let subject = Uuid::new_v4();
        let issued = codec.issue_at(subject, Role::User, Utc::now()).unwrap();

        let later = issued.expires_at + Duration::minutes(10);
        let refreshed = codec.refresh_at(&issued.token, later).unwrap();
        let claims = codec.verify_at(&refreshed.token, later).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, Role::User);
        assert!(refreshed.expires_at > later);
    }

    #[test]
    fn test_refresh_past_grace_is_expired() {
        let codec = codec();
        let issued = codec.issue(Uuid::new_v4(), Role::User).unwrap();

        let too_late = issued.expires_at + Duration::minutes(30);
        assert_eq!(
            codec.refresh_at(&issued.token, too_late).unwrap_err(),
            AuthError::Token(TokenError::Expired)
        );
    }

    #[test]
    fn test_refresh_rejects_tampered_token() {
        let codec = codec();
        let issued = codec.issue(Uuid::new_v4(), Role::User).unwrap();
        let tampered = flip_signature_bit(&issued.token, 12);
        assert_eq!(
            codec.refresh(&tampered).unwrap_err(),
            AuthError::Token(TokenError::BadSignature)
        );
    }
}
