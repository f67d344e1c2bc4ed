//! PostgreSQL credential store.
//!
//! Lookups go through the `login_identity` view, which unions the three
//! principal tables. Writes go to the table that owns the principal. The
//! `login_name` table keeps email and username unique across all of them.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use shelter_auth::store::{CredentialStore, StoreError};
use shelter_entity::identity::{CredentialUpdate, Identity, LoginIdentifier, Role};

const SELECT_IDENTITY: &str =
    "SELECT subject_id, email, username, password_hash, role FROM login_identity";

/// [`CredentialStore`] over the principal tables.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new credential store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn role_of(&self, subject_id: Uuid) -> Result<Role, StoreError> {
        sqlx::query_scalar::<_, Role>("SELECT role FROM login_identity WHERE subject_id = $1")
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("resolve principal role", e))?
            .ok_or(StoreError::NotFound)
    }
}

/// Table holding principals of `role`.
fn table_for(role: Role) -> &'static str {
    match role {
        Role::User => "usuario",
        Role::Ong => "ong",
        Role::Admin => "administrador",
    }
}

/// Lookup query for one identifier kind. Emails compare lowercased.
///
/// Fetches up to two rows so a duplicate across principal kinds is caught
/// instead of silently picking one.
fn lookup_sql(identifier: &LoginIdentifier) -> String {
    let predicate = match identifier {
        LoginIdentifier::Email(_) => "lower(email) = lower($1)",
        LoginIdentifier::Username(_) => "username = $1",
    };
    format!("{SELECT_IDENTITY} WHERE {predicate} LIMIT 2")
}

/// Resolves lookup rows to at most one identity.
fn single_identity(mut rows: Vec<Identity>) -> Result<Option<Identity>, StoreError> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        _ => {
            let subjects: Vec<_> = rows.iter().map(|r| r.subject_id).collect();
            error!(?subjects, "Login identifier resolves to several principals");
            Err(StoreError::Inconsistent(
                "login identifier is not unique".to_string(),
            ))
        }
    }
}

fn unavailable(action: &str, e: sqlx::Error) -> StoreError {
    error!(error = %e, action, "Credential store query failed");
    StoreError::Unavailable(format!("failed to {action}"))
}

fn write_error(action: &str, e: sqlx::Error) -> StoreError {
    let unique_violation = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique_violation {
        StoreError::Conflict("Email or username already in use".to_string())
    } else {
        unavailable(action, e)
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login_identifier(
        &self,
        identifier: &LoginIdentifier,
    ) -> Result<Option<Identity>, StoreError> {
        let rows = sqlx::query_as::<_, Identity>(&lookup_sql(identifier))
            .bind(identifier.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("find identity", e))?;
        single_identity(rows)
    }

    async fn save_secret_hash(
        &self,
        subject_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let role = self.role_of(subject_id).await?;
        let sql = format!("UPDATE {} SET senha = $2 WHERE id = $1", table_for(role));
        let result = sqlx::query(&sql)
            .bind(subject_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("save password hash", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, StoreError> {
        let sql = format!("{SELECT_IDENTITY} ORDER BY email");
        sqlx::query_as::<_, Identity>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("list identities", e))
    }

    async fn update_credentials(
        &self,
        subject_id: Uuid,
        update: &CredentialUpdate,
    ) -> Result<(), StoreError> {
        let role = self.role_of(subject_id).await?;
        let sql = format!(
            "UPDATE {} SET email = COALESCE($2, email), nome_usuario = COALESCE($3, nome_usuario), \
             senha = COALESCE($4, senha) WHERE id = $1",
            table_for(role)
        );
        let result = sqlx::query(&sql)
            .bind(subject_id)
            .bind(update.email.as_deref())
            .bind(update.username.as_deref())
            .bind(update.password_hash.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("update credentials", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
