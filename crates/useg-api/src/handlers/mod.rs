//! Route handlers
//!
//! All HTTP request handlers organized by resource.

pub mod health;
pub mod segments;
pub mod user_segments;
pub mod users;
