//! PostgreSQL implementation of MembershipRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use useg_core::entities::MembershipPeriod;
use useg_core::error::DomainError;
use useg_core::traits::{MembershipRepository, MembershipTransaction, RepoResult};
use useg_core::value_objects::{SegmentKey, SegmentName, UserId};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of MembershipRepository
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    /// Create a new PgMembershipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn MembershipTransaction>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgMembershipTransaction { tx }))
    }

    #[instrument(skip(self))]
    async fn user_segments(&self, user_id: UserId, at: DateTime<Utc>) -> RepoResult<Vec<SegmentName>> {
        let names = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT s.name
            FROM user2seg u2s
            JOIN segments s ON u2s.s_id = s.id
            WHERE u2s.u_id = $1 AND u2s.date_end > $2
            ORDER BY s.name
            ",
        )
        .bind(user_id.into_inner())
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(names.into_iter().map(SegmentName::from).collect())
    }
}

/// Membership writes inside a PostgreSQL transaction
///
/// Dropping it without committing rolls the transaction back.
pub struct PgMembershipTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MembershipTransaction for PgMembershipTransaction {
    #[instrument(skip(self))]
    async fn segment_key(&mut self, name: &SegmentName) -> RepoResult<Option<SegmentKey>> {
        let result = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM segments WHERE name = $1
            ",
        )
        .bind(name.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(SegmentKey::new))
    }

    #[instrument(skip(self))]
    async fn add_membership(
        &mut self,
        user_id: UserId,
        segment: SegmentKey,
        period: MembershipPeriod,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user2seg (u_id, s_id, date_add, date_end)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id.into_inner())
        .bind(segment.into_inner())
        .bind(period.started_at)
        .bind(period.ends_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::MembershipConflict(user_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_membership(&mut self, user_id: UserId, segment: SegmentKey) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM user2seg WHERE u_id = $1 AND s_id = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(segment.into_inner())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
