//! Service context - dependency container for services
//!
//! Holds the repositories the services drive. The store handle is always
//! passed explicitly; there is no process-wide connection.

use std::sync::Arc;

use useg_core::traits::{IdentityRepository, MembershipRepository};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    identity_repo: Arc<dyn IdentityRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        identity_repo: Arc<dyn IdentityRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            identity_repo,
            membership_repo,
        }
    }

    /// Create a context whose repositories are both served by `store`
    pub fn from_store<S>(store: S) -> Self
    where
        S: IdentityRepository + MembershipRepository + Clone + 'static,
    {
        Self::new(Arc::new(store.clone()), Arc::new(store))
    }

    // === Repositories ===

    /// Get the identity repository
    pub fn identity_repo(&self) -> &dyn IdentityRepository {
        self.identity_repo.as_ref()
    }

    /// Get the membership repository
    pub fn membership_repo(&self) -> &dyn MembershipRepository {
        self.membership_repo.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    identity_repo: Option<Arc<dyn IdentityRepository>>,
    membership_repo: Option<Arc<dyn MembershipRepository>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_repo(mut self, repo: Arc<dyn IdentityRepository>) -> Self {
        self.identity_repo = Some(repo);
        self
    }

    pub fn membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.identity_repo
                .ok_or_else(|| ServiceError::validation("identity_repo is required"))?,
            self.membership_repo
                .ok_or_else(|| ServiceError::validation("membership_repo is required"))?,
        ))
    }
}
