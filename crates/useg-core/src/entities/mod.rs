//! Domain entities

mod membership;

pub use membership::{infinite_end, MembershipPeriod};
