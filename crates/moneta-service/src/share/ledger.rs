//! Share access ledger — who has accessed which share.

use std::sync::Arc;

use uuid::Uuid;

use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_entity::share::{ShareAccessLog, SharedResource};
use moneta_entity::store::ShareAccessStore;

/// Records share accesses and backs "shared with me" listings.
///
/// Recording is an idempotent upsert keyed on the `(user, resource)`
/// unique constraint, so concurrent first accesses never produce two rows
/// or lose a count.
#[derive(Clone)]
pub struct ShareAccessLedger {
    store: Arc<dyn ShareAccessStore>,
}

impl ShareAccessLedger {
    /// Creates a new ledger over the given store.
    pub fn new(store: Arc<dyn ShareAccessStore>) -> Self {
        Self { store }
    }

    /// Record one access by a user to a shared resource.
    pub async fn record_access(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<ShareAccessLog> {
        self.store
            .record_access(accessing_user_id, shared_resource_id)
            .await
    }

    /// Resources the user has ever accessed, most recently accessed first.
    pub async fn list_shared_with_me(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        self.store.list_accessed_resources(user_id, page).await
    }

    /// Pin or unpin a share in the user's "shared with me" list.
    pub async fn toggle_saved(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
        saved: bool,
    ) -> AppResult<ShareAccessLog> {
        self.store
            .set_saved(accessing_user_id, shared_resource_id, saved)
            .await
    }

    /// The access record for a `(user, resource)` pair, if any.
    pub async fn find(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<Option<ShareAccessLog>> {
        self.store.find(accessing_user_id, shared_resource_id).await
    }
}

impl std::fmt::Debug for ShareAccessLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareAccessLedger").finish_non_exhaustive()
    }
}
