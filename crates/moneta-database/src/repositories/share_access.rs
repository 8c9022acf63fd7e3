//! Share access log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use moneta_core::error::{AppError, ErrorKind};
use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_entity::share::{ShareAccessLog, SharedResource};
use moneta_entity::store::ShareAccessStore;

/// PostgreSQL-backed share access ledger store.
///
/// Concurrent first accesses by the same user for the same share resolve
/// to a single row through the `(accessing_user_id, shared_resource_id)`
/// unique constraint and an `ON CONFLICT` upsert — no global lock.
#[derive(Debug, Clone)]
pub struct ShareAccessRepository {
    pool: PgPool,
}

impl ShareAccessRepository {
    /// Create a new share access repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareAccessStore for ShareAccessRepository {
    async fn record_access(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<ShareAccessLog> {
        sqlx::query_as::<_, ShareAccessLog>(
            "INSERT INTO share_access_logs (accessing_user_id, shared_resource_id) \
             VALUES ($1, $2) \
             ON CONFLICT (accessing_user_id, shared_resource_id) DO UPDATE \
             SET access_count = share_access_logs.access_count + 1, last_accessed_at = NOW() \
             RETURNING *",
        )
        .bind(accessing_user_id)
        .bind(shared_resource_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record share access", e)
        })
    }

    async fn find(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
    ) -> AppResult<Option<ShareAccessLog>> {
        sqlx::query_as::<_, ShareAccessLog>(
            "SELECT * FROM share_access_logs \
             WHERE accessing_user_id = $1 AND shared_resource_id = $2",
        )
        .bind(accessing_user_id)
        .bind(shared_resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find access log", e)
        })
    }

    async fn list_accessed_resources(
        &self,
        accessing_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM share_access_logs WHERE accessing_user_id = $1",
        )
        .bind(accessing_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count access logs", e)
        })?;

        let shares = sqlx::query_as::<_, SharedResource>(
            "SELECT s.* FROM shares s \
             INNER JOIN share_access_logs l ON l.shared_resource_id = s.id \
             WHERE l.accessing_user_id = $1 \
             ORDER BY l.last_accessed_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(accessing_user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list accessed shares", e)
        })?;

        Ok(PageResponse::new(shares, page, total as u64))
    }

    async fn set_saved(
        &self,
        accessing_user_id: Uuid,
        shared_resource_id: Uuid,
        saved: bool,
    ) -> AppResult<ShareAccessLog> {
        sqlx::query_as::<_, ShareAccessLog>(
            "UPDATE share_access_logs SET is_saved = $3 \
             WHERE accessing_user_id = $1 AND shared_resource_id = $2 RETURNING *",
        )
        .bind(accessing_user_id)
        .bind(shared_resource_id)
        .bind(saved)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update saved flag", e)
        })?
        .ok_or_else(|| AppError::not_found("No access record for this share"))
    }
}
