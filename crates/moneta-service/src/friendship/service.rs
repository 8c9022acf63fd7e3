//! Friendship lifecycle and access grant management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use moneta_core::config::friendship::FriendshipConfig;
use moneta_core::error::{AppError, ErrorKind};
use moneta_core::result::AppResult;
use moneta_core::types::access::AccessLevel;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_entity::friendship::{CreateFriendship, Friendship, FriendshipStatus};
use moneta_entity::store::{FriendshipStore, UserStore};

/// Owns the friendship state machine and its per-direction access grants.
///
/// `Pending → {Accepted, Rejected, Cancelled}`; rejected and cancelled
/// requests are deleted rather than retained, so retrying requires a
/// fresh request. All precondition failures are returned before any
/// mutation occurs.
#[derive(Clone)]
pub struct FriendshipService {
    friendships: Arc<dyn FriendshipStore>,
    users: Arc<dyn UserStore>,
    config: FriendshipConfig,
}

impl FriendshipService {
    /// Creates a new friendship service.
    pub fn new(
        friendships: Arc<dyn FriendshipStore>,
        users: Arc<dyn UserStore>,
        config: FriendshipConfig,
    ) -> Self {
        Self {
            friendships,
            users,
            config,
        }
    }

    /// Sends a friend request from `requester_id` to `recipient_id`.
    pub async fn send_request(
        &self,
        requester_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<Friendship> {
        if requester_id == recipient_id {
            return Err(AppError::new(
                ErrorKind::FriendSelfRequest,
                "Cannot send a friend request to yourself",
            ));
        }

        if self.users.find_by_id(recipient_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "User {recipient_id} does not exist"
            )));
        }

        if let Some(existing) = self
            .friendships
            .find_by_pair(requester_id, recipient_id)
            .await?
        {
            return Err(match existing.status {
                FriendshipStatus::Pending => AppError::new(
                    ErrorKind::FriendRequestAlreadySent,
                    "A friend request is already pending for this pair",
                ),
                FriendshipStatus::Accepted => AppError::new(
                    ErrorKind::FriendAlreadyAdded,
                    "These users are already friends",
                ),
                _ => AppError::conflict("A friendship row already exists for this pair"),
            });
        }

        let friendship = self
            .friendships
            .create(&CreateFriendship {
                requester_id,
                recipient_id,
            })
            .await?;

        info!(
            friendship_id = %friendship.id,
            requester_id = %requester_id,
            recipient_id = %recipient_id,
            "Friend request sent"
        );

        Ok(friendship)
    }

    /// Accepts a pending request. Only the recipient may accept; both
    /// directions start at the configured default access level.
    pub async fn accept(&self, friendship_id: Uuid, acting_user_id: Uuid) -> AppResult<Friendship> {
        let mut friendship = self.find_pending(friendship_id).await?;

        if friendship.recipient_id != acting_user_id {
            return Err(AppError::access_denied(
                "Only the recipient may accept a friend request",
            ));
        }

        friendship.status = FriendshipStatus::Accepted;
        friendship.requester_access = self.config.default_access_on_accept;
        friendship.recipient_access = self.config.default_access_on_accept;

        let friendship = self.friendships.update(&friendship).await?;

        info!(
            friendship_id = %friendship.id,
            default_access = %self.config.default_access_on_accept,
            "Friend request accepted"
        );

        Ok(friendship)
    }

    /// Rejects a pending request. Only the recipient may reject; the row
    /// is deleted.
    pub async fn reject(&self, friendship_id: Uuid, acting_user_id: Uuid) -> AppResult<()> {
        let friendship = self.find_pending(friendship_id).await?;

        if friendship.recipient_id != acting_user_id {
            return Err(AppError::access_denied(
                "Only the recipient may reject a friend request",
            ));
        }

        self.friendships.delete(friendship.id).await?;
        info!(friendship_id = %friendship.id, "Friend request rejected");
        Ok(())
    }

    /// Cancels a pending request. Only the requester may cancel; the row
    /// is deleted.
    pub async fn cancel(&self, friendship_id: Uuid, acting_user_id: Uuid) -> AppResult<()> {
        let friendship = self.find_pending(friendship_id).await?;

        if friendship.requester_id != acting_user_id {
            return Err(AppError::access_denied(
                "Only the requester may cancel a friend request",
            ));
        }

        self.friendships.delete(friendship.id).await?;
        info!(friendship_id = %friendship.id, "Friend request cancelled");
        Ok(())
    }

    /// Adjusts the grant the acting user extends to the other party.
    /// Valid only on accepted friendships; a party can never mutate the
    /// grant made by the counterpart.
    pub async fn set_access_level(
        &self,
        friendship_id: Uuid,
        granting_user_id: Uuid,
        level: AccessLevel,
    ) -> AppResult<Friendship> {
        let mut friendship = self.find_existing(friendship_id).await?;

        if !friendship.is_accepted() {
            return Err(AppError::validation(
                "Access levels can only be changed on accepted friendships",
            ));
        }

        if !friendship.set_grant(granting_user_id, level) {
            return Err(AppError::access_denied(
                "Only a party to the friendship may change their grant",
            ));
        }

        let friendship = self.friendships.update(&friendship).await?;

        info!(
            friendship_id = %friendship.id,
            granting_user_id = %granting_user_id,
            level = %level,
            "Access level updated"
        );

        Ok(friendship)
    }

    /// Removes a friendship. Either party may invoke; the row is deleted.
    pub async fn remove(&self, friendship_id: Uuid, acting_user_id: Uuid) -> AppResult<()> {
        let friendship = self.find_existing(friendship_id).await?;

        if !friendship.involves(acting_user_id) {
            return Err(AppError::access_denied(
                "Only a party to the friendship may remove it",
            ));
        }

        self.friendships.delete(friendship.id).await?;
        info!(
            friendship_id = %friendship.id,
            acting_user_id = %acting_user_id,
            "Friendship removed"
        );
        Ok(())
    }

    /// Fetch a friendship by ID.
    pub async fn get(&self, friendship_id: Uuid) -> AppResult<Friendship> {
        self.find_existing(friendship_id).await
    }

    /// List friendships involving a user, optionally filtered by status.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<FriendshipStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Friendship>> {
        self.friendships.list_for_user(user_id, status, page).await
    }

    /// Pending requests awaiting the given user's decision.
    pub async fn list_pending_for(&self, user_id: Uuid) -> AppResult<Vec<Friendship>> {
        self.friendships.list_pending_for_recipient(user_id).await
    }

    async fn find_existing(&self, friendship_id: Uuid) -> AppResult<Friendship> {
        self.friendships
            .find_by_id(friendship_id)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::FriendNotFound,
                    format!("Friendship {friendship_id} not found"),
                )
            })
    }

    async fn find_pending(&self, friendship_id: Uuid) -> AppResult<Friendship> {
        let friendship = self.friendships.find_by_id(friendship_id).await?;
        match friendship {
            Some(f) if f.is_pending() => Ok(f),
            _ => Err(AppError::new(
                ErrorKind::FriendRequestNotFound,
                format!("No pending friend request {friendship_id}"),
            )),
        }
    }
}

impl std::fmt::Debug for FriendshipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendshipService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use moneta_database::MemoryStore;
    use moneta_entity::user::CreateUser;

    struct Fixture {
        service: FriendshipService,
        store: Arc<MemoryStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = FriendshipService::new(
            Arc::clone(&store) as Arc<dyn FriendshipStore>,
            Arc::clone(&store) as Arc<dyn UserStore>,
            FriendshipConfig::default(),
        );
        Fixture { service, store }
    }

    async fn make_user(store: &MemoryStore, username: &str) -> Uuid {
        UserStore::create(
            store,
            &CreateUser {
                username: username.to_string(),
                email: None,
                display_name: None,
                avatar_url: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_self_request_is_rejected() {
        let fx = fixture().await;
        let user = Uuid::new_v4();

        let err = fx.service.send_request(user, user).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::FriendSelfRequest);
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_is_rejected_in_both_directions() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        fx.service.send_request(alice, bob).await.unwrap();

        let same = fx.service.send_request(alice, bob).await.unwrap_err();
        assert_eq!(same.kind, ErrorKind::FriendRequestAlreadySent);

        let reversed = fx.service.send_request(bob, alice).await.unwrap_err();
        assert_eq!(reversed.kind, ErrorKind::FriendRequestAlreadySent);
    }

    #[tokio::test]
    async fn test_request_to_accepted_pair_is_already_added() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        fx.service.accept(request.id, bob).await.unwrap();

        let err = fx.service.send_request(alice, bob).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::FriendAlreadyAdded);
    }

    #[tokio::test]
    async fn test_only_recipient_accepts_and_defaults_apply() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        assert_eq!(request.requester_access, AccessLevel::None);
        assert_eq!(request.recipient_access, AccessLevel::None);

        let err = fx.service.accept(request.id, alice).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessDenied);

        let accepted = fx.service.accept(request.id, bob).await.unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        assert_eq!(accepted.requester_access, AccessLevel::Limited);
        assert_eq!(accepted.recipient_access, AccessLevel::Limited);
    }

    #[tokio::test]
    async fn test_reject_deletes_the_row_so_a_fresh_request_works() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        fx.service.reject(request.id, bob).await.unwrap();

        let err = fx.service.get(request.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::FriendNotFound);

        // Retrying after rejection issues a brand new request.
        fx.service.send_request(alice, bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_requester_only() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();

        let err = fx.service.cancel(request.id, bob).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessDenied);

        fx.service.cancel(request.id, alice).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_access_level_mutates_only_own_grant() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        fx.service.accept(request.id, bob).await.unwrap();

        // Alice raises what she grants Bob; Bob's grant is untouched.
        let updated = fx
            .service
            .set_access_level(request.id, alice, AccessLevel::Write)
            .await
            .unwrap();
        assert_eq!(updated.requester_access, AccessLevel::Write);
        assert_eq!(updated.recipient_access, AccessLevel::Limited);

        let outsider = Uuid::new_v4();
        let err = fx
            .service
            .set_access_level(request.id, outsider, AccessLevel::Full)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn test_set_access_level_requires_accepted_status() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        let err = fx
            .service
            .set_access_level(request.id, alice, AccessLevel::Read)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_either_party_may_remove() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;

        let request = fx.service.send_request(alice, bob).await.unwrap();
        fx.service.accept(request.id, bob).await.unwrap();

        fx.service.remove(request.id, alice).await.unwrap();
        let err = fx.service.get(request.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::FriendNotFound);
    }

    #[tokio::test]
    async fn test_request_to_unknown_user_fails() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;

        let err = fx
            .service
            .send_request(alice, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_pending_requests_listed_for_recipient() {
        let fx = fixture().await;
        let alice = make_user(&fx.store, "alice").await;
        let bob = make_user(&fx.store, "bob").await;
        let carol = make_user(&fx.store, "carol").await;

        fx.service.send_request(alice, carol).await.unwrap();
        fx.service.send_request(bob, carol).await.unwrap();

        let pending = fx.service.list_pending_for(carol).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|f| f.recipient_id == carol));
    }
}
