//! In-memory implementation of all store traits.
//!
//! Backs the same contracts as the PostgreSQL repositories with
//! `RwLock`-guarded maps. The share-access upsert increments under the
//! write lock, so concurrent first accesses by the same user collapse to
//! a single entry exactly as the database unique constraint does.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use moneta_core::error::AppError;
use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};

use moneta_entity::friendship::{CreateFriendship, Friendship, FriendshipStatus};
use moneta_entity::share::{CreateSharedResource, ShareAccessLog, SharedResource};
use moneta_entity::store::{FriendshipStore, ShareAccessStore, ShareStore, UserStore};
use moneta_entity::user::{CreateUser, User};

use moneta_core::types::access::AccessLevel;

/// In-memory backend implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    friendships: RwLock<HashMap<Uuid, Friendship>>,
    shares: RwLock<HashMap<Uuid, SharedResource>>,
    access_logs: RwLock<HashMap<(Uuid, Uuid), ShareAccessLog>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone + serde::Serialize>(
    mut items: Vec<T>,
    page: &PageRequest,
) -> PageResponse<T> {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.limit() as usize).min(items.len());
    let items = items.drain(start..end).collect();
    PageResponse::new(items, page, total)
}

#[async_trait]
impl FriendshipStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Friendship>> {
        Ok(self.friendships.read().await.get(&id).cloned())
    }

    async fn find_by_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        if a == b {
            return Ok(None);
        }
        Ok(self
            .friendships
            .read()
            .await
            .values()
            .find(|f| f.involves(a) && f.involves(b))
            .cloned())
    }

    async fn find_accepted_for_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        if a == b {
            return Ok(None);
        }
        Ok(self
            .friendships
            .read()
            .await
            .values()
            .find(|f| f.is_accepted() && f.involves(a) && f.involves(b))
            .cloned())
    }

    async fn create(&self, data: &CreateFriendship) -> AppResult<Friendship> {
        let mut friendships = self.friendships.write().await;
        if friendships
            .values()
            .any(|f| f.involves(data.requester_id) && f.involves(data.recipient_id))
        {
            return Err(AppError::conflict("A friendship already exists for this pair"));
        }
        let now = Utc::now();
        let friendship = Friendship {
            id: Uuid::new_v4(),
            requester_id: data.requester_id,
            recipient_id: data.recipient_id,
            status: FriendshipStatus::Pending,
            requester_access: AccessLevel::None,
            recipient_access: AccessLevel::None,
            created_at: now,
            updated_at: now,
        };
        friendships.insert(friendship.id, friendship.clone());
        Ok(friendship)
    }

    async fn update(&self, friendship: &Friendship) -> AppResult<Friendship> {
        let mut friendships = self.friendships.write().await;
        let entry = friendships.get_mut(&friendship.id).ok_or_else(|| {
            AppError::new(
                moneta_core::error::ErrorKind::FriendNotFound,
                format!("Friendship {} not found", friendship.id),
            )
        })?;
        *entry = Friendship {
            updated_at: Utc::now(),
            ..friendship.clone()
        };
        Ok(entry.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.friendships.write().await.remove(&id).is_some())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<FriendshipStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Friendship>> {
        let mut items: Vec<Friendship> = self
            .friendships
            .read()
            .await
            .values()
            .filter(|f| f.involves(user_id))
            .filter(|f| status.is_none_or(|s| f.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn list_pending_for_recipient(&self, user_id: Uuid) -> AppResult<Vec<Friendship>> {
        let mut items: Vec<Friendship> = self
            .friendships
            .read()
            .await
            .values()
            .filter(|f| f.recipient_id == user_id && f.is_pending())
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SharedResource>> {
        Ok(self.shares.read().await.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<SharedResource>> {
        Ok(self
            .shares
            .read()
            .await
            .values()
            .find(|s| s.share_token == token)
            .cloned())
    }

    async fn create(&self, data: &CreateSharedResource) -> AppResult<SharedResource> {
        let mut shares = self.shares.write().await;
        if shares.values().any(|s| s.share_token == data.share_token) {
            return Err(AppError::conflict("Share token already exists"));
        }
        let share = SharedResource {
            id: Uuid::new_v4(),
            share_token: data.share_token.clone(),
            owner_user_id: data.owner_user_id,
            resource_type: data.resource_type,
            resource_refs: data.resource_refs.clone(),
            share_name: data.share_name.clone(),
            permission: data.permission,
            visibility: data.visibility,
            allowed_user_ids: data.allowed_user_ids.clone(),
            expires_at: data.expires_at,
            is_active: true,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
            revoked_at: None,
        };
        shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn record_access(&self, id: Uuid) -> AppResult<SharedResource> {
        let mut shares = self.shares.write().await;
        let share = shares.get_mut(&id).ok_or_else(|| {
            AppError::new(
                moneta_core::error::ErrorKind::ShareNotFound,
                format!("Share {id} not found"),
            )
        })?;
        share.access_count += 1;
        share.last_accessed_at = Some(Utc::now());
        Ok(share.clone())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<SharedResource> {
        let mut shares = self.shares.write().await;
        let share = shares.get_mut(&id).ok_or_else(|| {
            AppError::new(
                moneta_core::error::ErrorKind::ShareNotFound,
                format!("Share {id} not found"),
            )
        })?;
        if share.is_active {
            share.is_active = false;
            share.revoked_at = Some(Utc::now());
        }
        Ok(share.clone())
    }

    async fn list_by_owner(
        &self,
        owner_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        let mut items: Vec<SharedResource> = self
            .shares
            .read()
            .await
            .values()
            .filter(|s| s.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }
}

#[async_trait]
impl ShareAccessStore for MemoryStore {
    async fn record_access(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<ShareAccessLog> {
        let mut logs = self.access_logs.write().await;
        let now = Utc::now();
        let entry = logs
            .entry((accessing_user_id, shared_resource_id))
            .and_modify(|log| {
                log.access_count += 1;
                log.last_accessed_at = now;
            })
            .or_insert_with(|| ShareAccessLog {
                id: Uuid::new_v4(),
                accessing_user_id,
                shared_resource_id,
                first_accessed_at: now,
                last_accessed_at: now,
                access_count: 1,
                is_saved: false,
            });
        Ok(entry.clone())
    }

    async fn find(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<Option<ShareAccessLog>> {
        Ok(self
            .access_logs
            .read()
            .await
            .get(&(accessing_user_id, shared_resource_id))
            .cloned())
    }

    async fn list_accessed_resources(
        &self,
        accessing_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        let logs = self.access_logs.read().await;
        let shares = self.shares.read().await;
        let mut accessed: Vec<&ShareAccessLog> = logs
            .values()
            .filter(|l| l.accessing_user_id == accessing_user_id)
            .collect();
        accessed.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
        let items: Vec<SharedResource> = accessed
            .iter()
            .filter_map(|l| shares.get(&l.shared_resource_id).cloned())
            .collect();
        Ok(paginate(items, page))
    }

    async fn set_saved(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
        saved: bool,
    ) -> AppResult<ShareAccessLog> {
        let mut logs = self.access_logs.write().await;
        let log = logs
            .get_mut(&(accessing_user_id, shared_resource_id))
            .ok_or_else(|| AppError::not_found("No access record for this share"))?;
        log.is_saved = saved;
        Ok(log.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict("Username already taken"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            email: data.email.clone(),
            display_name: data.display_name.clone(),
            avatar_url: data.avatar_url.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_first_access_yields_one_row_with_count_two() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let share = Uuid::new_v4();

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { ShareAccessStore::record_access(&*store, user, share).await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { ShareAccessStore::record_access(&*store, user, share).await })
        };
        let (a, b) = tokio::join!(a, b);
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let log = store.find(user, share).await.unwrap().expect("row exists");
        assert_eq!(log.access_count, 2);
    }

    #[tokio::test]
    async fn test_pair_uniqueness_is_direction_agnostic() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        FriendshipStore::create(
            &store,
            &CreateFriendship {
                requester_id: a,
                recipient_id: b,
            },
        )
        .await
        .unwrap();

        let reversed = FriendshipStore::create(
            &store,
            &CreateFriendship {
                requester_id: b,
                recipient_id: a,
            },
        )
        .await;
        assert!(reversed.is_err());
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent_and_keeps_first_revocation_time() {
        let store = MemoryStore::new();
        let share = ShareStore::create(
            &store,
            &CreateSharedResource {
                share_token: "x".repeat(64),
                owner_user_id: Uuid::new_v4(),
                resource_type: moneta_core::types::resource::ResourceKind::Bill,
                resource_refs: vec![Uuid::new_v4()],
                share_name: None,
                permission: moneta_entity::share::SharePermission::View,
                visibility: moneta_entity::share::ShareVisibility::Public,
                allowed_user_ids: Vec::new(),
                expires_at: None,
            },
        )
        .await
        .unwrap();

        let first = store.deactivate(share.id).await.unwrap();
        let second = store.deactivate(share.id).await.unwrap();
        assert!(!second.is_active);
        assert_eq!(first.revoked_at, second.revoked_at);
    }
}
