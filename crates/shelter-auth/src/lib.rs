//! # shelter-auth
//!
//! Authentication and authorization core for the Shelter pet-adoption service.
//!
//! ## Modules
//!
//! - `store`: credential store boundary and an in-memory implementation
//! - `password`: scheme-tagged password hashing (Argon2id current, PBKDF2 legacy)
//! - `jwt`: signed, time-bounded bearer token issuance and verification
//! - `gate`: the login flow
//! - `policy`: route/method to role table and its evaluation
//! - `migration`: startup pass over stored hashes
//! - `credentials`: capability-checked credential updates

pub mod context;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod migration;
pub mod password;
pub mod policy;
pub mod store;

pub use context::AuthenticatedContext;
pub use credentials::{CredentialMerger, CredentialPatch};
pub use error::{AuthError, TokenError};
pub use gate::AuthenticationGate;
pub use jwt::{Claims, IssuedToken, TokenCodec};
pub use migration::{LegacyHashMigrator, MigrationReport};
pub use password::PasswordHasher;
pub use policy::{Decision, DenyReason, RoutePolicy};
pub use store::{CredentialStore, MemoryCredentialStore, StoreError};
