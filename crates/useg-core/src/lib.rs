//! # useg-core
//!
//! Domain layer containing identities, membership periods, repository traits, and domain errors.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{infinite_end, MembershipPeriod};
pub use error::DomainError;
pub use traits::{IdentityRepository, MembershipRepository, MembershipTransaction, RepoResult};
pub use value_objects::{SegmentKey, SegmentName, UserId};
