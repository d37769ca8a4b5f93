//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Missing numeric and string fields deserialize to their zero value so that
//! validation, not decoding, reports them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use useg_core::value_objects::{SegmentName, UserId};

// ============================================================================
// User Requests
// ============================================================================

/// A user reference: `{"id": 7}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserRequest {
    #[serde(default)]
    #[validate(range(min = 1, message = "bad request"))]
    pub id: i64,
}

impl UserRequest {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }
}

// ============================================================================
// Segment Requests
// ============================================================================

/// A segment reference: `{"name": "VIP"}`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SegmentRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "there is no segment"))]
    pub name: String,
}

impl SegmentRequest {
    pub fn segment_name(&self) -> SegmentName {
        SegmentName::new(&self.name)
    }
}

/// Segment entry inside a user-segments request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SegmentRef {
    #[serde(default)]
    #[validate(length(min = 1, message = "there is no segment"))]
    pub name: String,
}

// ============================================================================
// User Segment Requests
// ============================================================================

/// Assign or remove segments for one user
///
/// `date_end` only applies to assignment; it is ignored on removal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserSegmentsRequest {
    #[serde(default)]
    #[validate(range(min = 1, message = "bad request"))]
    pub id: i64,

    #[validate(required(message = "bad request"), nested)]
    pub segments: Option<Vec<SegmentRef>>,

    #[serde(default)]
    pub date_end: Option<DateTime<Utc>>,
}

impl UserSegmentsRequest {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }

    /// Normalized names in request order
    pub fn segment_names(&self) -> Vec<SegmentName> {
        self.segments
            .iter()
            .flatten()
            .map(|s| SegmentName::new(&s.name))
            .collect()
    }
}
