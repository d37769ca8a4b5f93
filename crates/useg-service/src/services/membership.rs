//! Membership service
//!
//! Transactional mutations of the user-segment relation. Assignments are
//! all-or-nothing; removals skip segment names the store does not know.
//! Every protocol holds one transaction handle and only commits on the
//! success path, so returning early through `?` rolls everything back.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use useg_core::entities::MembershipPeriod;
use useg_core::error::DomainError;
use useg_core::value_objects::{SegmentName, UserId};

use crate::dto::SegmentResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::user::ensure_valid_user;

/// Every requested segment must be named
fn ensure_named(segments: &[SegmentName]) -> ServiceResult<()> {
    if segments.iter().any(SegmentName::is_empty) {
        return Err(ServiceError::validation("there is no segment"));
    }
    Ok(())
}

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add every user in `user_ids` to one segment, open-ended from now
    ///
    /// The segment is resolved before the transaction opens. A single failed
    /// insert aborts the whole batch.
    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    pub async fn assign_segment_to_users(&self, name: &SegmentName, user_ids: &[UserId]) -> ServiceResult<()> {
        let segment = self
            .ctx
            .identity_repo()
            .segment_key(name)
            .await?
            .ok_or_else(|| DomainError::SegmentNotFound(name.clone()))?;

        let period = MembershipPeriod::starting_now(None);
        let mut tx = self.ctx.membership_repo().begin().await?;
        for &user_id in user_ids {
            tx.add_membership(user_id, segment, period).await?;
        }
        tx.commit().await?;

        info!(segment = %name, count = user_ids.len(), "Segment assigned to users");
        Ok(())
    }

    /// Add one user to each named segment until `ends_at`
    ///
    /// The user is created first when unknown. An unknown segment name
    /// aborts the whole assignment; the user record is kept either way.
    /// All rows share one start instant, so naming a segment twice in one
    /// request is a `MembershipConflict`.
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn assign_segments_to_user(
        &self,
        user_id: UserId,
        segments: &[SegmentName],
        ends_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<()> {
        ensure_valid_user(user_id)?;
        ensure_named(segments)?;

        if self.ctx.identity_repo().check_or_create_user(user_id).await? {
            info!(%user_id, "User created on first assignment");
        }

        let period = MembershipPeriod::starting_now(ends_at);
        let mut tx = self.ctx.membership_repo().begin().await?;
        for name in segments {
            let segment = tx
                .segment_key(name)
                .await?
                .ok_or_else(|| DomainError::SegmentNotFound(name.clone()))?;
            tx.add_membership(user_id, segment, period).await?;
        }
        tx.commit().await?;

        info!(%user_id, count = segments.len(), ends_at = %period.ends_at, "Segments assigned to user");
        Ok(())
    }

    /// Remove one user from each named segment, skipping unknown names
    ///
    /// Returns the number of membership rows deleted.
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn remove_segments_from_user(&self, user_id: UserId, segments: &[SegmentName]) -> ServiceResult<u64> {
        ensure_valid_user(user_id)?;
        ensure_named(segments)?;

        if !self.ctx.identity_repo().user_exists(user_id).await? {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        let mut removed = 0;
        let mut tx = self.ctx.membership_repo().begin().await?;
        for name in segments {
            let Some(segment) = tx.segment_key(name).await? else {
                debug!(segment = %name, "Skipping unknown segment");
                continue;
            };
            removed += tx.remove_membership(user_id, segment).await?;
        }
        tx.commit().await?;

        info!(%user_id, removed, "Segments removed from user");
        Ok(removed)
    }

    /// Segments the user currently belongs to
    #[instrument(skip(self))]
    pub async fn user_segments(&self, user_id: UserId) -> ServiceResult<Vec<SegmentResponse>> {
        ensure_valid_user(user_id)?;

        let names = self
            .ctx
            .membership_repo()
            .user_segments(user_id, Utc::now())
            .await?;

        Ok(names.into_iter().map(SegmentResponse::from).collect())
    }
}
