//! Friendship store contract.

use async_trait::async_trait;
use uuid::Uuid;

use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};

use crate::friendship::{CreateFriendship, Friendship, FriendshipStatus};

/// Persistence operations for friendships.
///
/// At most one row exists per unordered user pair; the backend enforces
/// this with a unique constraint.
#[async_trait]
pub trait FriendshipStore: Send + Sync + 'static {
    /// Find a friendship by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Friendship>>;

    /// Find the friendship between two users, regardless of direction or
    /// status.
    async fn find_by_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>>;

    /// Find the accepted friendship between two users, if any. This is the
    /// single indexed lookup on the access evaluation hot path.
    async fn find_accepted_for_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>>;

    /// Create a new pending friendship with no access granted in either
    /// direction. Fails with a conflict if a row for the pair exists.
    async fn create(&self, data: &CreateFriendship) -> AppResult<Friendship>;

    /// Persist status and grant changes.
    async fn update(&self, friendship: &Friendship) -> AppResult<Friendship>;

    /// Delete a friendship row. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// List friendships involving a user, optionally filtered by status,
    /// newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<FriendshipStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Friendship>>;

    /// Pending requests awaiting the given recipient's decision.
    async fn list_pending_for_recipient(&self, user_id: Uuid) -> AppResult<Vec<Friendship>>;
}
