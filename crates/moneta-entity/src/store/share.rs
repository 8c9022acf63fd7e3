//! Shared resource store contract.

use async_trait::async_trait;
use uuid::Uuid;

use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};

use crate::share::{CreateSharedResource, SharedResource};

/// Persistence operations for shared resources.
#[async_trait]
pub trait ShareStore: Send + Sync + 'static {
    /// Find a share by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SharedResource>>;

    /// Find a share by token, including revoked and expired shares —
    /// the service layer distinguishes missing from invalid.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<SharedResource>>;

    /// Create a new share. Fails with a conflict if the token collides
    /// with an existing one, so the caller can retry with a fresh token.
    async fn create(&self, data: &CreateSharedResource) -> AppResult<SharedResource>;

    /// Record a successful resolution: increments `access_count` and
    /// stamps `last_accessed_at`.
    async fn record_access(&self, id: Uuid) -> AppResult<SharedResource>;

    /// Deactivate a share, stamping `revoked_at`. Already-inactive shares
    /// are left untouched.
    async fn deactivate(&self, id: Uuid) -> AppResult<SharedResource>;

    /// List shares created by a user, newest first.
    async fn list_by_owner(
        &self,
        owner_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>>;
}
