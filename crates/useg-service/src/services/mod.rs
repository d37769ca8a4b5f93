//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of one
//! request and drives the repositories it holds.

pub mod context;
pub mod error;
pub mod membership;
pub mod segment;
pub mod user;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use membership::MembershipService;
pub use segment::{sample_population, SegmentService};
pub use user::UserService;
