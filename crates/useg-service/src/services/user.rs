//! User service
//!
//! Handles explicit user registration.

use tracing::{info, instrument};

use useg_core::value_objects::UserId;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Reject IDs the store would never hand out
pub(crate) fn ensure_valid_user(user_id: UserId) -> ServiceResult<()> {
    if user_id.is_valid() {
        Ok(())
    } else {
        Err(ServiceError::validation("bad request"))
    }
}

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create each user in order
    ///
    /// Inserts are unconditional; the first failure (a duplicate ID included)
    /// stops the batch and is returned. Users created before it are kept.
    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    pub async fn create_users(&self, user_ids: &[UserId]) -> ServiceResult<()> {
        for &user_id in user_ids {
            ensure_valid_user(user_id)?;
        }

        for &user_id in user_ids {
            self.ctx.identity_repo().create_user(user_id).await?;
        }

        info!(count = user_ids.len(), "Users created");
        Ok(())
    }
}
