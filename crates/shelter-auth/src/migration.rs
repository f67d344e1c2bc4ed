//! Startup pass over stored password hashes.
//!
//! Untagged values in the legacy layout get an explicit `{pbkdf2}` tag so
//! every stored value names its scheme. Anything else without a tag is
//! reported as unrecognized and left as is. Re-deriving a legacy hash needs the plaintext, so
//! tagged legacy values wait for the owner's next successful login, where
//! [`AuthenticationGate`](crate::gate::AuthenticationGate) upgrades them.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::password::{HashScheme, HashStatus, StoredHash};
use crate::store::CredentialStore;

/// Per-outcome counts of one migration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Identities looked at.
    pub examined: usize,
    /// Already on the current scheme.
    pub already_current: usize,
    /// Untagged values rewritten with an explicit legacy tag.
    pub retagged: usize,
    /// Legacy values left for upgrade on next login.
    pub pending_rehash: usize,
    /// Values no scheme recognizes: unknown tags and untagged foreign text.
    pub unrecognized: usize,
    /// Records whose write failed.
    pub failed: usize,
}

impl MigrationReport {
    /// Number of writes performed.
    pub fn writes(&self) -> usize {
        self.retagged
    }
}

/// Runs the one-shot hash migration over every identity.
pub struct LegacyHashMigrator {
    store: Arc<dyn CredentialStore>,
}

impl LegacyHashMigrator {
    /// Creates a migrator over `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Walks all identities sequentially.
    ///
    /// Only a failure to list identities aborts the pass; per-record write
    /// failures are logged and counted. Running it twice performs no writes
    /// the second time.
    pub async fn run(&self) -> Result<MigrationReport, AuthError> {
        let started = Instant::now();
        let identities = self.store.list_identities().await.map_err(|e| {
            warn!(error = %e, "Hash migration could not list identities");
            AuthError::from(e)
        })?;

        let mut report = MigrationReport::default();
        for identity in identities {
            report.examined += 1;
            let stored = StoredHash::parse(&identity.password_hash);
            match stored.status() {
                HashStatus::Current => report.already_current += 1,
                HashStatus::LegacyTagged => report.pending_rehash += 1,
                HashStatus::Unrecognized => {
                    report.unrecognized += 1;
                    warn!(
                        subject_id = %identity.subject_id,
                        "Stored hash matches no known scheme; left untouched"
                    );
                }
                HashStatus::LegacyUntagged => {
                    let tagged = HashScheme::Pbkdf2.tagged(&identity.password_hash);
                    match self.store.save_secret_hash(identity.subject_id, &tagged).await {
                        Ok(()) => {
                            report.retagged += 1;
                            report.pending_rehash += 1;
                            debug!(subject_id = %identity.subject_id, "Legacy hash tagged");
                        }
                        Err(e) => {
                            report.failed += 1;
                            warn!(
                                subject_id = %identity.subject_id,
                                error = %e,
                                "Failed to tag legacy hash"
                            );
                        }
                    }
                }
            }
        }

        info!(
            examined = report.examined,
            already_current = report.already_current,
            retagged = report.retagged,
            pending_rehash = report.pending_rehash,
            unrecognized = report.unrecognized,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Hash migration finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use shelter_entity::identity::{CredentialUpdate, Identity, LoginIdentifier, Role};

    use super::*;
    use crate::password::{PasswordHasher, legacy};
    use crate::store::{MemoryCredentialStore, StoreError};

    fn identity(email: &str, password_hash: String) -> Identity {
        Identity {
            subject_id: Uuid::new_v4(),
            email: email.to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            password_hash,
            role: Role::User,
        }
    }

    async fn seeded() -> (MemoryCredentialStore, Vec<Uuid>) {
        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        let store = MemoryCredentialStore::new();
        let records = vec![
            identity("current@example.com", hasher.hash("pw").unwrap()),
            identity("untagged@example.com", legacy::encode("pw", [7; 8])),
            identity(
                "tagged@example.com",
                HashScheme::Pbkdf2.tagged(&legacy::encode("pw", [9; 8])),
            ),
            identity("odd@example.com", "{bcrypt}$2a$10$abc".to_string()),
        ];
        let ids = records.iter().map(|r| r.subject_id).collect();
        for record in records {
            store.insert(record).await.unwrap();
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_run_classifies_every_record() {
        let (store, ids) = seeded().await;
        let report = LegacyHashMigrator::new(Arc::new(store.clone()))
            .run()
            .await
            .unwrap();

        assert_eq!(
            report,
            MigrationReport {
                examined: 4,
                already_current: 1,
                retagged: 1,
                pending_rehash: 2,
                unrecognized: 1,
                failed: 0,
            }
        );

        let untagged = store.get(ids[1]).await.unwrap();
        assert!(untagged.password_hash.starts_with("{pbkdf2}"));
        let odd = store.get(ids[3]).await.unwrap();
        assert_eq!(odd.password_hash, "{bcrypt}$2a$10$abc");
    }

    #[tokio::test]
    async fn test_untagged_foreign_hash_is_not_retagged() {
        let bcrypt = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";
        let store = MemoryCredentialStore::new();
        let record = identity("bcrypt@example.com", bcrypt.to_string());
        let subject_id = record.subject_id;
        store.insert(record).await.unwrap();

        let report = LegacyHashMigrator::new(Arc::new(store.clone()))
            .run()
            .await
            .unwrap();

        assert_eq!(report.unrecognized, 1);
        assert_eq!(report.retagged, 0);
        assert_eq!(report.pending_rehash, 0);
        assert_eq!(report.writes(), 0);
        assert_eq!(store.get(subject_id).await.unwrap().password_hash, bcrypt);
    }

    #[tokio::test]
    async fn test_retagged_hash_still_verifies() {
        let (store, ids) = seeded().await;
        LegacyHashMigrator::new(Arc::new(store.clone()))
            .run()
            .await
            .unwrap();

        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        let untagged = store.get(ids[1]).await.unwrap();
        assert!(hasher.verify("pw", &untagged.password_hash));
        assert!(!hasher.verify("other", &untagged.password_hash));
    }

    #[tokio::test]
    async fn test_second_run_writes_nothing() {
        let (store, _) = seeded().await;
        let migrator = LegacyHashMigrator::new(Arc::new(store));
        let first = migrator.run().await.unwrap();
        assert_eq!(first.writes(), 1);

        let second = migrator.run().await.unwrap();
        assert_eq!(second.writes(), 0);
        assert_eq!(second.pending_rehash, 2);
        assert_eq!(second.already_current, 1);
    }

    /// Fails writes for one subject and counts all writes.
    struct FlakyStore {
        inner: MemoryCredentialStore,
        broken: Uuid,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl CredentialStore for FlakyStore {
        async fn find_by_login_identifier(
            &self,
            identifier: &LoginIdentifier,
        ) -> Result<Option<Identity>, StoreError> {
            self.inner.find_by_login_identifier(identifier).await
        }

        async fn save_secret_hash(&self, subject_id: Uuid, hash: &str) -> Result<(), StoreError> {
            if subject_id == self.broken {
                return Err(StoreError::Unavailable("write timed out".into()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.save_secret_hash(subject_id, hash).await
        }

        async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
            self.inner.list_identities().await
        }

        async fn update_credentials(
            &self,
            subject_id: Uuid,
            update: &CredentialUpdate,
        ) -> Result<(), StoreError> {
            self.inner.update_credentials(subject_id, update).await
        }
    }

    #[tokio::test]
    async fn test_one_failing_record_does_not_stop_the_pass() {
        let inner = MemoryCredentialStore::new();
        let a = identity("a@example.com", legacy::encode("a", [1; 8]));
        let b = identity("b@example.com", legacy::encode("b", [2; 8]));
        let c = identity("c@example.com", legacy::encode("c", [3; 8]));
        let broken = b.subject_id;
        for record in [a.clone(), b, c.clone()] {
            inner.insert(record).await.unwrap();
        }

        let store = Arc::new(FlakyStore {
            inner: inner.clone(),
            broken,
            writes: AtomicUsize::new(0),
        });
        let report = LegacyHashMigrator::new(store.clone()).run().await.unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.retagged, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
        assert!(inner.get(a.subject_id).await.unwrap().password_hash.starts_with("{pbkdf2}"));
        assert!(inner.get(c.subject_id).await.unwrap().password_hash.starts_with("{pbkdf2}"));
        assert!(!inner.get(broken).await.unwrap().password_hash.starts_with('{'));
    }

    #[tokio::test]
    async fn test_list_failure_aborts() {
        struct Down;

        #[async_trait]
        impl CredentialStore for Down {
            async fn find_by_login_identifier(
                &self,
                _: &LoginIdentifier,
            ) -> Result<Option<Identity>, StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
            async fn save_secret_hash(&self, _: Uuid, _: &str) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
            async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
            async fn update_credentials(
                &self,
                _: Uuid,
                _: &CredentialUpdate,
            ) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
        }

        let err = LegacyHashMigrator::new(Arc::new(Down)).run().await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }
}
