//! Share access log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A record of one user's accesses to one shared resource.
///
/// Unique on `(accessing_user_id, shared_resource_id)`: the first access
/// creates the row, subsequent accesses increment it in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareAccessLog {
    /// Unique log entry identifier.
    pub id: Uuid,
    /// The user who accessed the share.
    pub accessing_user_id: Uuid,
    /// The shared resource that was accessed.
    pub shared_resource_id: Uuid,
    /// First access time for this pair.
    pub first_accessed_at: DateTime<Utc>,
    /// Most recent access time for this pair.
    pub last_accessed_at: DateTime<Utc>,
    /// Number of accesses by this user.
    pub access_count: i64,
    /// Whether the user pinned this share in their "shared with me" list.
    pub is_saved: bool,
}
