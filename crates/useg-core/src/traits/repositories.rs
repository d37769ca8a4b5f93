//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Implementations hold no cached state: every
//! call reflects the store as it is at call time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::MembershipPeriod;
use crate::error::DomainError;
use crate::value_objects::{SegmentKey, SegmentName, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Identity Repository
// ============================================================================

#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Resolve a segment name to its surrogate key (`None` if unknown)
    async fn segment_key(&self, name: &SegmentName) -> RepoResult<Option<SegmentKey>>;

    /// Create a segment; fails with `SegmentAlreadyExists` on a duplicate name
    async fn create_segment(&self, name: &SegmentName) -> RepoResult<()>;

    /// Delete a segment and its memberships; unknown names are a no-op
    async fn delete_segment(&self, name: &SegmentName) -> RepoResult<()>;

    /// Check if a user is known
    async fn user_exists(&self, id: UserId) -> RepoResult<bool>;

    /// Insert a user without checking for an existing record
    async fn create_user(&self, id: UserId) -> RepoResult<()>;

    /// Create the user unless it already exists
    ///
    /// Returns `true` when a record was created. Losing a creation race to a
    /// concurrent request counts as "already exists".
    async fn check_or_create_user(&self, id: UserId) -> RepoResult<bool> {
        if self.user_exists(id).await? {
            return Ok(false);
        }
        match self.create_user(id).await {
            Ok(()) => Ok(true),
            Err(DomainError::UserAlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// List every known user ID, unordered
    async fn all_user_ids(&self) -> RepoResult<Vec<UserId>>;

    /// Cheap round-trip to verify the store is reachable
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Open a transaction scoped to the returned handle
    ///
    /// Dropping the handle without calling [`MembershipTransaction::commit`]
    /// rolls back everything written through it.
    async fn begin(&self) -> RepoResult<Box<dyn MembershipTransaction>>;

    /// Names of the segments the user belongs to at `at`
    async fn user_segments(&self, user_id: UserId, at: DateTime<Utc>) -> RepoResult<Vec<SegmentName>>;
}

/// An open membership transaction
#[async_trait]
pub trait MembershipTransaction: Send {
    /// Resolve a segment name inside the transaction
    async fn segment_key(&mut self, name: &SegmentName) -> RepoResult<Option<SegmentKey>>;

    /// Insert a membership row; fails with `MembershipConflict` on a duplicate
    async fn add_membership(
        &mut self,
        user_id: UserId,
        segment: SegmentKey,
        period: MembershipPeriod,
    ) -> RepoResult<()>;

    /// Delete the user's membership rows for a segment, returning how many went
    async fn remove_membership(&mut self, user_id: UserId, segment: SegmentKey) -> RepoResult<u64>;

    /// Make every write of this transaction visible
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}
