//! # shelter-entity
//!
//! Domain models for the Shelter auth core. Every principal kind
//! (end-user, organization, administrator) is represented by a single
//! [`identity::Identity`] record for login purposes.

pub mod identity;
