//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in useg-core.

mod error;
mod identity;
mod membership;

pub use identity::PgIdentityRepository;
pub use membership::{PgMembershipRepository, PgMembershipTransaction};
