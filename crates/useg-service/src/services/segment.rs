//! Segment service
//!
//! Segment lifecycle plus percentage-based bulk assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use useg_core::error::DomainError;
use useg_core::value_objects::{SegmentName, UserId};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::membership::MembershipService;

/// Pick `floor(percent * len / 100)` distinct users uniformly at random
///
/// The IDs are shuffled in place (Fisher-Yates) and the prefix is kept.
/// An empty sample is an error rather than a no-op.
pub fn sample_population<R>(
    mut user_ids: Vec<UserId>,
    percent: i64,
    rng: &mut R,
) -> Result<Vec<UserId>, DomainError>
where
    R: Rng + ?Sized,
{
    let population = user_ids.len();
    let wanted = percent.saturating_mul(population as i64) / 100;
    let n = usize::try_from(wanted).unwrap_or(0).min(population);

    if n == 0 {
        return Err(DomainError::InsufficientPopulation {
            percent,
            population,
        });
    }

    user_ids.shuffle(rng);
    user_ids.truncate(n);
    Ok(user_ids)
}

/// Segment service
pub struct SegmentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SegmentService<'a> {
    /// Create a new SegmentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a segment, optionally assigning it to `percent`% of all users
    ///
    /// Returns how many users received the segment. When the sample comes
    /// out empty the segment stays created and
    /// `DomainError::InsufficientPopulation` is returned.
    pub async fn create_segment(&self, name: &SegmentName, percent: Option<i64>) -> ServiceResult<usize> {
        let mut rng = StdRng::from_entropy();
        self.create_segment_with_rng(name, percent, &mut rng).await
    }

    /// [`Self::create_segment`] with a caller-supplied random source
    #[instrument(skip(self, rng))]
    pub async fn create_segment_with_rng<R>(
        &self,
        name: &SegmentName,
        percent: Option<i64>,
        rng: &mut R,
    ) -> ServiceResult<usize>
    where
        R: Rng + Send,
    {
        if name.is_empty() {
            return Err(ServiceError::validation("there is no segment"));
        }
        if let Some(percent) = percent {
            if !(0..=100).contains(&percent) {
                return Err(ServiceError::validation("percent must be between 0 and 100"));
            }
        }

        self.ctx.identity_repo().create_segment(name).await?;
        info!(segment = %name, "Segment created");

        let Some(percent) = percent else {
            return Ok(0);
        };

        let user_ids = self.ctx.identity_repo().all_user_ids().await?;
        let population = user_ids.len();
        let sample = sample_population(user_ids, percent, rng)?;

        MembershipService::new(self.ctx)
            .assign_segment_to_users(name, &sample)
            .await?;

        info!(
            segment = %name,
            percent,
            population,
            assigned = sample.len(),
            "Segment assigned to user sample"
        );
        Ok(sample.len())
    }

    /// Delete a segment and every membership in it; unknown names are a no-op
    #[instrument(skip(self))]
    pub async fn delete_segment(&self, name: &SegmentName) -> ServiceResult<()> {
        if name.is_empty() {
            return Err(ServiceError::validation("there is no segment"));
        }

        self.ctx.identity_repo().delete_segment(name).await?;

        info!(segment = %name, "Segment deleted");
        Ok(())
    }
}
