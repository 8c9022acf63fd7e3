//! Access evaluation over friendship grants.

use std::sync::Arc;

use uuid::Uuid;

use moneta_core::result::AppResult;
use moneta_core::types::access::AccessLevel;
use moneta_entity::store::FriendshipStore;

/// Answers "can actor X read/write user Y's data, and at what tier".
///
/// Sits on the hot read/write path of every domain service: self-access
/// short-circuits without a lookup, and everything else is a single
/// indexed store query. Performs no network calls. A missing friendship
/// resolves to [`AccessLevel::None`] — deny by default.
#[derive(Clone)]
pub struct AccessEvaluator {
    friendships: Arc<dyn FriendshipStore>,
}

impl AccessEvaluator {
    /// Create a new evaluator over the given friendship store.
    pub fn new(friendships: Arc<dyn FriendshipStore>) -> Self {
        Self { friendships }
    }

    /// The capability tier `actor` holds over `owner`'s data.
    pub async fn access_level(&self, owner_id: Uuid, actor_id: Uuid) -> AppResult<AccessLevel> {
        if owner_id == actor_id {
            return Ok(AccessLevel::Full);
        }

        let friendship = self
            .friendships
            .find_accepted_for_pair(owner_id, actor_id)
            .await?;

        Ok(friendship
            .and_then(|f| f.access_granted_by(owner_id))
            .unwrap_or(AccessLevel::None))
    }

    /// Whether `actor` may read anything of `owner`'s data.
    pub async fn can_access(&self, owner_id: Uuid, actor_id: Uuid) -> AppResult<bool> {
        Ok(self.access_level(owner_id, actor_id).await?.can_view())
    }

    /// Whether `actor` may create or update `owner`'s data.
    pub async fn can_modify(&self, owner_id: Uuid, actor_id: Uuid) -> AppResult<bool> {
        Ok(self.access_level(owner_id, actor_id).await?.can_modify())
    }
}

impl std::fmt::Debug for AccessEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEvaluator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use moneta_core::error::AppError;
    use moneta_core::types::pagination::{PageRequest, PageResponse};
    use moneta_database::MemoryStore;
    use moneta_entity::friendship::{CreateFriendship, Friendship, FriendshipStatus};

    async fn accepted_pair(
        store: &MemoryStore,
        owner: Uuid,
        actor: Uuid,
        granted_by_owner: AccessLevel,
    ) {
        let mut friendship = FriendshipStore::create(
            store,
            &CreateFriendship {
                requester_id: owner,
                recipient_id: actor,
            },
        )
        .await
        .unwrap();
        friendship.status = FriendshipStatus::Accepted;
        friendship.set_grant(owner, granted_by_owner);
        store.update(&friendship).await.unwrap();
    }

    #[tokio::test]
    async fn test_self_access_is_full_without_store_lookup() {
        // A store that panics on any pair lookup proves the fast path.
        #[derive(Debug)]
        struct PanickingStore;

        #[async_trait]
        impl moneta_entity::store::FriendshipStore for PanickingStore {
            async fn find_by_id(&self, _: Uuid) -> Result<Option<Friendship>, AppError> {
                panic!("unexpected lookup")
            }
            async fn find_by_pair(&self, _: Uuid, _: Uuid) -> Result<Option<Friendship>, AppError> {
                panic!("unexpected lookup")
            }
            async fn find_accepted_for_pair(
                &self,
                _: Uuid,
                _: Uuid,
            ) -> Result<Option<Friendship>, AppError> {
                panic!("unexpected lookup")
            }
            async fn create(&self, _: &CreateFriendship) -> Result<Friendship, AppError> {
                panic!("unexpected write")
            }
            async fn update(&self, _: &Friendship) -> Result<Friendship, AppError> {
                panic!("unexpected write")
            }
            async fn delete(&self, _: Uuid) -> Result<bool, AppError> {
                panic!("unexpected write")
            }
            async fn list_for_user(
                &self,
                _: Uuid,
                _: Option<FriendshipStatus>,
                _: &PageRequest,
            ) -> Result<PageResponse<Friendship>, AppError> {
                panic!("unexpected lookup")
            }
            async fn list_pending_for_recipient(
                &self,
                _: Uuid,
            ) -> Result<Vec<Friendship>, AppError> {
                panic!("unexpected lookup")
            }
        }

        let evaluator = AccessEvaluator::new(Arc::new(PanickingStore));
        let user = Uuid::new_v4();
        assert_eq!(
            evaluator.access_level(user, user).await.unwrap(),
            AccessLevel::Full
        );
    }

    #[tokio::test]
    async fn test_no_friendship_denies_by_default() {
        let evaluator = AccessEvaluator::new(Arc::new(MemoryStore::new()));
        let owner = Uuid::new_v4();
        let actor = Uuid::new_v4();

        assert_eq!(
            evaluator.access_level(owner, actor).await.unwrap(),
            AccessLevel::None
        );
        assert!(!evaluator.can_access(owner, actor).await.unwrap());
        assert!(!evaluator.can_modify(owner, actor).await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_grant_controls_actor_tier() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let actor = Uuid::new_v4();
        accepted_pair(&store, owner, actor, AccessLevel::Write).await;

        let evaluator = AccessEvaluator::new(store);
        assert_eq!(
            evaluator.access_level(owner, actor).await.unwrap(),
            AccessLevel::Write
        );
        assert!(evaluator.can_access(owner, actor).await.unwrap());
        assert!(evaluator.can_modify(owner, actor).await.unwrap());

        // The reverse direction carries the actor's own grant, which is
        // still None.
        assert_eq!(
            evaluator.access_level(actor, owner).await.unwrap(),
            AccessLevel::None
        );
    }

    #[tokio::test]
    async fn test_read_grant_views_but_does_not_modify() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let actor = Uuid::new_v4();
        accepted_pair(&store, owner, actor, AccessLevel::Read).await;

        let evaluator = AccessEvaluator::new(store);
        assert!(evaluator.can_access(owner, actor).await.unwrap());
        assert!(!evaluator.can_modify(owner, actor).await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_friendship_grants_nothing() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let actor = Uuid::new_v4();
        FriendshipStore::create(
            &*store,
            &CreateFriendship {
                requester_id: owner,
                recipient_id: actor,
            },
        )
        .await
        .unwrap();

        let evaluator = AccessEvaluator::new(store);
        assert!(!evaluator.can_access(owner, actor).await.unwrap());
    }
}
