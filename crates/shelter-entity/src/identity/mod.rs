//! Unified login identity, role, and login identifier.

pub mod identifier;
pub mod model;
pub mod role;

pub use identifier::LoginIdentifier;
pub use model::{CredentialUpdate, Identity};
pub use role::Role;
