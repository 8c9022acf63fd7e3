//! Share access log store contract.

use async_trait::async_trait;
use uuid::Uuid;

use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};

use crate::share::{ShareAccessLog, SharedResource};

/// Persistence operations for share access logs.
#[async_trait]
pub trait ShareAccessStore: Send + Sync + 'static {
    /// Upsert an access record: the first access per `(user, resource)`
    /// pair creates the row with count 1; later accesses increment the
    /// count and stamp `last_accessed_at`. Concurrent first accesses must
    /// resolve to a single row without losing a count — backends rely on
    /// the unique constraint, not a global lock.
    async fn record_access(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<ShareAccessLog>;

    /// Find the access record for a `(user, resource)` pair.
    async fn find(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<Option<ShareAccessLog>>;

    /// Resources the user has ever accessed, most recently accessed first.
    async fn list_accessed_resources(
        &self,
        accessing_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>>;

    /// Set or clear the saved flag on an access record.
    async fn set_saved(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
        saved: bool,
    ) -> AppResult<ShareAccessLog>;
}
