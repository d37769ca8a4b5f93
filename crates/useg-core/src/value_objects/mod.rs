//! Value objects - immutable types that represent domain concepts

mod segment_name;
mod user_id;

pub use segment_name::{SegmentKey, SegmentName};
pub use user_id::UserId;
