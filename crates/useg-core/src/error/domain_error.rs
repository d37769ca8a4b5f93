//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{SegmentName, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("there is no such user {0}")]
    UserNotFound(UserId),

    #[error("there is no such segment {0}")]
    SegmentNotFound(SegmentName),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Segment already exists: {0}")]
    SegmentAlreadyExists(SegmentName),

    #[error("User already exists: {0}")]
    UserAlreadyExists(UserId),

    #[error("Membership already exists for user {0}")]
    MembershipConflict(UserId),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("not enough users for that percent")]
    InsufficientPopulation { percent: i64, population: usize },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SegmentNotFound(_) => "UNKNOWN_SEGMENT",

            // Conflict
            Self::SegmentAlreadyExists(_) => "SEGMENT_ALREADY_EXISTS",
            Self::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            Self::MembershipConflict(_) => "MEMBERSHIP_CONFLICT",

            // Business Rules
            Self::InsufficientPopulation { .. } => "INSUFFICIENT_POPULATION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::SegmentNotFound(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SegmentAlreadyExists(_) | Self::UserAlreadyExists(_) | Self::MembershipConflict(_)
        )
    }

    /// Check if the store (not the caller) is at fault
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }
}
