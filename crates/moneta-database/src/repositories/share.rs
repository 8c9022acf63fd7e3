//! Shared resource repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use moneta_core::error::{AppError, ErrorKind};
use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_entity::share::{CreateSharedResource, SharedResource};
use moneta_entity::store::ShareStore;

/// PostgreSQL-backed shared resource store.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SharedResource>> {
        sqlx::query_as::<_, SharedResource>("SELECT * FROM shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<SharedResource>> {
        sqlx::query_as::<_, SharedResource>("SELECT * FROM shares WHERE share_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share by token", e)
            })
    }

    async fn create(&self, data: &CreateSharedResource) -> AppResult<SharedResource> {
        sqlx::query_as::<_, SharedResource>(
            "INSERT INTO shares (share_token, owner_user_id, resource_type, resource_refs, \
             share_name, permission, visibility, allowed_user_ids, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&data.share_token)
        .bind(data.owner_user_id)
        .bind(data.resource_type)
        .bind(&data.resource_refs)
        .bind(&data.share_name)
        .bind(data.permission)
        .bind(data.visibility)
        .bind(&data.allowed_user_ids)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Share token already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create share", e),
        })
    }

    async fn record_access(&self, id: Uuid) -> AppResult<SharedResource> {
        sqlx::query_as::<_, SharedResource>(
            "UPDATE shares SET access_count = access_count + 1, last_accessed_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record share access", e)
        })?
        .ok_or_else(|| AppError::new(ErrorKind::ShareNotFound, format!("Share {id} not found")))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<SharedResource> {
        sqlx::query_as::<_, SharedResource>(
            "UPDATE shares \
             SET is_active = FALSE, revoked_at = COALESCE(revoked_at, NOW()) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate share", e)
        })?
        .ok_or_else(|| AppError::new(ErrorKind::ShareNotFound, format!("Share {id} not found")))
    }

    async fn list_by_owner(
        &self,
        owner_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shares WHERE owner_user_id = $1")
                .bind(owner_user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count shares", e)
                })?;

        let shares = sqlx::query_as::<_, SharedResource>(
            "SELECT * FROM shares WHERE owner_user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list shares", e))?;

        Ok(PageResponse::new(shares, page, total as u64))
    }
}
