//! Friendship repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use moneta_core::error::{AppError, ErrorKind};
use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_entity::friendship::{CreateFriendship, Friendship, FriendshipStatus};
use moneta_entity::store::FriendshipStore;

/// PostgreSQL-backed friendship store.
#[derive(Debug, Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipStore for FriendshipRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Friendship>> {
        sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find friendship", e)
            })
    }

    async fn find_by_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships \
             WHERE (requester_id = $1 AND recipient_id = $2) \
                OR (requester_id = $2 AND recipient_id = $1)",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find friendship pair", e)
        })
    }

    async fn find_accepted_for_pair(&self, a: Uuid, b: Uuid) -> AppResult<Option<Friendship>> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships \
             WHERE status = 'accepted' \
               AND ((requester_id = $1 AND recipient_id = $2) \
                 OR (requester_id = $2 AND recipient_id = $1))",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find accepted friendship", e)
        })
    }

    async fn create(&self, data: &CreateFriendship) -> AppResult<Friendship> {
        sqlx::query_as::<_, Friendship>(
            "INSERT INTO friendships (requester_id, recipient_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.requester_id)
        .bind(data.recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("A friendship already exists for this pair")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create friendship", e),
        })
    }

    async fn update(&self, friendship: &Friendship) -> AppResult<Friendship> {
        sqlx::query_as::<_, Friendship>(
            "UPDATE friendships \
             SET status = $2, requester_access = $3, recipient_access = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(friendship.id)
        .bind(friendship.status)
        .bind(friendship.requester_access)
        .bind(friendship.recipient_access)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update friendship", e)
        })?
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::FriendNotFound,
                format!("Friendship {} not found", friendship.id),
            )
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete friendship", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<FriendshipStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Friendship>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM friendships \
             WHERE (requester_id = $1 OR recipient_id = $1) \
               AND ($2::friendship_status IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count friendships", e)
        })?;

        let friendships = sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships \
             WHERE (requester_id = $1 OR recipient_id = $1) \
               AND ($2::friendship_status IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list friendships", e)
        })?;

        Ok(PageResponse::new(friendships, page, total as u64))
    }

    async fn list_pending_for_recipient(&self, user_id: Uuid) -> AppResult<Vec<Friendship>> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships \
             WHERE recipient_id = $1 AND status = 'pending' ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending requests", e)
        })
    }
}
