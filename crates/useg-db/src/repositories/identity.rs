//! PostgreSQL implementation of IdentityRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use useg_core::error::DomainError;
use useg_core::traits::{IdentityRepository, RepoResult};
use useg_core::value_objects::{SegmentKey, SegmentName, UserId};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of IdentityRepository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    /// Create a new PgIdentityRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    #[instrument(skip(self))]
    async fn segment_key(&self, name: &SegmentName) -> RepoResult<Option<SegmentKey>> {
        let result = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM segments WHERE name = $1
            ",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(SegmentKey::new))
    }

    #[instrument(skip(self))]
    async fn create_segment(&self, name: &SegmentName) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO segments (name) VALUES ($1)
            ",
        )
        .bind(name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SegmentAlreadyExists(name.clone())))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_segment(&self, name: &SegmentName) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            DELETE FROM user2seg
            WHERE s_id IN (SELECT id FROM segments WHERE name = $1)
            ",
        )
        .bind(name.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            DELETE FROM segments WHERE name = $1
            ",
        )
        .bind(name.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)
            ",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn create_user(&self, id: UserId) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id) VALUES ($1)
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::UserAlreadyExists(id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn all_user_ids(&self) -> RepoResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
