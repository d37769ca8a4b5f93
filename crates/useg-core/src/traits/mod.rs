//! Repository traits (ports)

mod repositories;

pub use repositories::{
    IdentityRepository, MembershipRepository, MembershipTransaction, RepoResult,
};
