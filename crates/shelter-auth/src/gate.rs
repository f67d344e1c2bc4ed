//! Login flow: normalize, look up, verify, issue.

use std::sync::Arc;

use tracing::{debug, info, warn};

use shelter_entity::identity::{Identity, LoginIdentifier};

use crate::error::AuthError;
use crate::jwt::{IssuedToken, TokenCodec};
use crate::password::PasswordHasher;
use crate::store::CredentialStore;

/// Plaintext behind the dummy hash checked when an identifier is unknown.
const DUMMY_SECRET: &str = "shelter-dummy-secret";

/// Verifies credentials and issues bearer tokens.
#[derive(Clone)]
pub struct AuthenticationGate {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    codec: Arc<TokenCodec>,
    /// Current-scheme hash verified when no identity matches or when the
    /// stored hash is not on the current scheme. Every outcome pays for at
    /// least one current-scheme verification.
    dummy_hash: String,
}

impl std::fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGate").finish()
    }
}

impl AuthenticationGate {
    /// Creates a gate. Computes the dummy hash once.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;
        Ok(Self {
            store,
            hasher,
            codec,
            dummy_hash,
        })
    }

    /// Performs the login flow:
    ///
    /// 1. Normalize the identifier (emails lowercased, usernames untouched)
    /// 2. Unified lookup across all principal kinds
    /// 3. Verify the secret (against a dummy hash when nothing matched, and
    ///    additionally when the stored hash is legacy or unrecognized)
    /// 4. Issue a token for the identity's subject and role
    ///
    /// Every rejection is `InvalidCredentials`.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let identifier = LoginIdentifier::normalize(identifier);

        let identity = self
            .store
            .find_by_login_identifier(&identifier)
            .await
            .map_err(|e| {
                warn!(error = %e, "Credential lookup failed");
                AuthError::from(e)
            })?;

        let Some(identity) = identity else {
            let _ = self.hasher.verify(secret, &self.dummy_hash);
            debug!(email = identifier.is_email(), "Login rejected: unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        let outdated = self.hasher.needs_rehash(&identity.password_hash);
        let verified = self.hasher.verify(secret, &identity.password_hash);
        if outdated {
            // Legacy and unknown schemes are far cheaper than Argon2.
            let _ = self.hasher.verify(secret, &self.dummy_hash);
        }

        if !verified {
            debug!(subject_id = %identity.subject_id, "Login rejected: secret mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if outdated {
            self.upgrade_hash(&identity, secret).await;
        }

        let issued = self.codec.issue(identity.subject_id, identity.role)?;
        info!(
            subject_id = %identity.subject_id,
            role = %identity.role,
            "Login successful"
        );
        Ok(issued)
    }

    /// Re-hashes a verified plaintext with the current scheme and stores it.
    ///
    /// Failures are logged; the login still succeeds.
    async fn upgrade_hash(&self, identity: &Identity, secret: &str) {
        let new_hash = match self.hasher.hash(secret) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(subject_id = %identity.subject_id, error = %e, "Hash upgrade failed");
                return;
            }
        };
        match self
            .store
            .save_secret_hash(identity.subject_id, &new_hash)
            .await
        {
            Ok(()) => info!(subject_id = %identity.subject_id, "Upgraded legacy password hash"),
            Err(e) => {
                warn!(subject_id = %identity.subject_id, error = %e, "Failed to persist upgraded hash")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use uuid::Uuid;

    use shelter_core::config::AuthConfig;
    use shelter_entity::identity::{CredentialUpdate, Role};

    use crate::error::TokenError;
    use crate::password::legacy;
    use crate::store::{MemoryCredentialStore, StoreError};

    use super::*;

    struct Fixture {
        store: MemoryCredentialStore,
        hasher: Arc<PasswordHasher>,
        codec: Arc<TokenCodec>,
        gate: AuthenticationGate,
    }

    fn fixture() -> Fixture {
        let store = MemoryCredentialStore::new();
        let hasher = Arc::new(PasswordHasher::with_params(4096, 1, 1).unwrap());
        let codec = Arc::new(TokenCodec::new(&AuthConfig::with_secret(
            "test-secret-test-secret-test-secret",
        )));
        let gate = AuthenticationGate::new(
            Arc::new(store.clone()),
            Arc::clone(&hasher),
            Arc::clone(&codec),
        )
        .unwrap();
        Fixture {
            store,
            hasher,
            codec,
            gate,
        }
    }

    async fn add(f: &Fixture, email: &str, username: &str, secret: &str, role: Role) -> Uuid {
        let subject_id = Uuid::new_v4();
        f.store
            .insert(Identity {
                subject_id,
                email: email.to_string(),
                username: username.to_string(),
                password_hash: f.hasher.hash(secret).unwrap(),
                role,
            })
            .await
            .unwrap();
        subject_id
    }

    #[tokio::test]
    async fn test_login_round_trips_for_every_role() {
        let f = fixture();
        for (i, role) in Role::ALL.into_iter().enumerate() {
            let email = format!("p{i}@example.com");
            let subject = add(&f, &email, &format!("p{i}"), "pw", role).await;

            for identifier in [email.clone(), format!("p{i}")] {
                let issued = f.gate.login(&identifier, "pw").await.unwrap();
                let claims = f.codec.verify(&issued.token).unwrap();
                assert_eq!(claims.sub, subject);
                assert_eq!(claims.role, role);
            }
        }
    }

    #[tokio::test]
    async fn test_email_identifier_is_normalized() {
        let f = fixture();
        add(&f, "myuser@example.com", "myuser", "pw", Role::User).await;
        assert!(f.gate.login("MyUser@Example.COM", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_username_identifier_is_case_sensitive() {
        let f = fixture();
        add(&f, "x@example.com", "MyUsername", "pw", Role::Ong).await;
        assert!(f.gate.login("MyUsername", "pw").await.is_ok());
        assert_eq!(
            f.gate.login("myusername", "pw").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_wrong_secret_and_unknown_identifier_look_alike() {
        let f = fixture();
        add(&f, "joao@example.com", "joao", "right", Role::User).await;

        let wrong = f.gate.login("joao@example.com", "wrong").await.unwrap_err();
        let missing = f
            .gate
            .login("nonexistent@example.com", "anything")
            .await
            .unwrap_err();
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(wrong, missing);
        assert_eq!(wrong.to_string(), missing.to_string());
    }

    fn median(mut samples: Vec<Duration>) -> Duration {
        samples.sort();
        samples[samples.len() / 2]
    }

    #[tokio::test]
    async fn test_rejection_latency_is_comparable() {
        let f = fixture();
        add(&f, "joao@example.com", "joao", "right", Role::User).await;

        let mut wrong = Vec::new();
        let mut missing = Vec::new();
        for _ in 0..7 {
            let start = Instant::now();
            let _ = f.gate.login("joao@example.com", "wrong").await;
            wrong.push(start.elapsed());

            let start = Instant::now();
            let _ = f.gate.login("nonexistent@example.com", "wrong").await;
            missing.push(start.elapsed());
        }

        let (wrong, missing) = (median(wrong), median(missing));
        let ratio = wrong.as_secs_f64() / missing.as_secs_f64();
        assert!(
            (0.33..3.0).contains(&ratio),
            "wrong={wrong:?} missing={missing:?}"
        );
    }

    #[tokio::test]
    async fn test_non_current_hashes_cost_as_much_as_unknown_identifier() {
        let store = MemoryCredentialStore::new();
        let config = AuthConfig::with_secret("test-secret-test-secret-test-secret");
        let hasher = Arc::new(PasswordHasher::new(&config).unwrap());
        let gate = AuthenticationGate::new(
            Arc::new(store.clone()),
            Arc::clone(&hasher),
            Arc::new(TokenCodec::new(&config)),
        )
        .unwrap();

        let untagged = legacy::encode("right", [3u8; legacy::SALT_LEN]);
        let stored = [
            ("untagged", untagged.clone()),
            ("tagged", format!("{{pbkdf2}}{untagged}")),
            ("foreign", "{bcrypt}$2a$10$abcdefghijklmnopqrstuv".to_string()),
        ];
        for (username, password_hash) in &stored {
            store
                .insert(Identity {
                    subject_id: Uuid::new_v4(),
                    email: format!("{username}@example.com"),
                    username: username.to_string(),
                    password_hash: password_hash.clone(),
                    role: Role::User,
                })
                .await
                .unwrap();
        }

        for (username, _) in &stored {
            let mut wrong = Vec::new();
            let mut missing = Vec::new();
            for _ in 0..3 {
                let start = Instant::now();
                let _ = gate.login(username, "wrong").await;
                wrong.push(start.elapsed());

                let start = Instant::now();
                let _ = gate.login("nobody", "wrong").await;
                missing.push(start.elapsed());
            }

            let (wrong, missing) = (median(wrong), median(missing));
            let ratio = wrong.as_secs_f64() / missing.as_secs_f64();
            assert!(
                (0.33..3.0).contains(&ratio),
                "{username}: wrong={wrong:?} missing={missing:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_legacy_hash_upgraded_on_login() {
        let f = fixture();
        let subject_id = Uuid::new_v4();
        f.store
            .insert(Identity {
                subject_id,
                email: "old@example.com".to_string(),
                username: "old".to_string(),
                password_hash: legacy::encode("pw", [1u8; legacy::SALT_LEN]),
                role: Role::Ong,
            })
            .await
            .unwrap();

        f.gate.login("old", "pw").await.unwrap();

        let stored = f.store.get(subject_id).await.unwrap().password_hash;
        assert!(stored.starts_with("{argon2}"));
        assert!(f.hasher.verify("pw", &stored));
        assert!(f.gate.login("old", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_login_does_not_touch_legacy_hash() {
        let f = fixture();
        let subject_id = Uuid::new_v4();
        let legacy_hash = legacy::encode("pw", [2u8; legacy::SALT_LEN]);
        f.store
            .insert(Identity {
                subject_id,
                email: "old@example.com".to_string(),
                username: "old".to_string(),
                password_hash: legacy_hash.clone(),
                role: Role::User,
            })
            .await
            .unwrap();

        assert!(f.gate.login("old", "nope").await.is_err());
        assert_eq!(f.store.get(subject_id).await.unwrap().password_hash, legacy_hash);
    }

    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn find_by_login_identifier(
            &self,
            _: &LoginIdentifier,
        ) -> Result<Option<Identity>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn save_secret_hash(&self, _: Uuid, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn update_credentials(
            &self,
            _: Uuid,
            _: &CredentialUpdate,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let f = fixture();
        let gate =
            AuthenticationGate::new(Arc::new(DownStore), Arc::clone(&f.hasher), Arc::clone(&f.codec))
                .unwrap();
        assert!(matches!(
            gate.login("a@b.c", "pw").await.unwrap_err(),
            AuthError::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_issued_token_expires() {
        let f = fixture();
        add(&f, "t@example.com", "t", "pw", Role::Admin).await;
        let issued = f.gate.login("t", "pw").await.unwrap();
        assert_eq!(
            f.codec
                .verify_at(&issued.token, issued.expires_at + chrono::Duration::seconds(1))
                .unwrap_err(),
            TokenError::Expired
        );
    }
}
