//! Shared resource entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use moneta_core::types::resource::ResourceKind;

/// Permission granted by a share.
///
/// `Edit` is additive/update only: it never authorizes deletion of the
/// owner's underlying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_permission", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// Read-only access to the shared refs.
    View,
    /// Read plus create/update on the shared refs.
    Edit,
}

/// Who may resolve a share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShareVisibility {
    /// Anyone, identified or not.
    Public,
    /// The owner and users with friendship access to the owner.
    FriendsOnly,
    /// Only the users listed in `allowed_user_ids`.
    SpecificUsers,
    /// Anyone who possesses the link; no identity check.
    LinkOnly,
}

/// A token-addressable, revocable, possibly time-boxed pointer to a subset
/// of a user's financial data, exposed outside the friendship graph.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedResource {
    /// Unique share identifier.
    pub id: Uuid,
    /// Globally-unique URL-safe token, 64 characters.
    pub share_token: String,
    /// The user whose data is shared.
    pub owner_user_id: Uuid,
    /// The kind of resource being shared.
    pub resource_type: ResourceKind,
    /// IDs of the shared records.
    pub resource_refs: Vec<Uuid>,
    /// Optional label shown to viewers.
    pub share_name: Option<String>,
    /// Permission granted to resolvers.
    pub permission: SharePermission,
    /// Visibility rule applied at resolution.
    pub visibility: ShareVisibility,
    /// Users allowed to resolve when visibility is `SpecificUsers`.
    pub allowed_user_ids: Vec<Uuid>,
    /// When the share expires (None = never, until revoked).
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the share is currently active.
    pub is_active: bool,
    /// Number of successful resolutions.
    pub access_count: i64,
    /// Last successful resolution time.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// When the share was revoked (one-way).
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SharedResource {
    /// Whether the share can still be resolved: active and not past its
    /// expiry.
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_expired()
    }

    /// Whether the share's expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Utc::now() > exp).unwrap_or(false)
    }

    /// Whether the given user appears in the specific-users allow list.
    pub fn allows_user(&self, user_id: Uuid) -> bool {
        self.allowed_user_ids.contains(&user_id)
    }
}

/// Data required to create a new shared resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSharedResource {
    /// Generated share token.
    pub share_token: String,
    /// The owning user.
    pub owner_user_id: Uuid,
    /// The kind of resource being shared.
    pub resource_type: ResourceKind,
    /// IDs of the shared records.
    pub resource_refs: Vec<Uuid>,
    /// Optional label.
    pub share_name: Option<String>,
    /// Permission granted to resolvers.
    pub permission: SharePermission,
    /// Visibility rule.
    pub visibility: ShareVisibility,
    /// Allow list for `SpecificUsers` visibility.
    pub allowed_user_ids: Vec<Uuid>,
    /// Expiry time (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> SharedResource {
        SharedResource {
            id: Uuid::new_v4(),
            share_token: "t".repeat(64),
            owner_user_id: Uuid::new_v4(),
            resource_type: ResourceKind::Category,
            resource_refs: vec![Uuid::new_v4()],
            share_name: None,
            permission: SharePermission::View,
            visibility: ShareVisibility::Public,
            allowed_user_ids: Vec::new(),
            expires_at: None,
            is_active: true,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[test]
    fn test_valid_when_active_and_unexpired() {
        let share = sample();
        assert!(share.is_valid());
    }

    #[test]
    fn test_invalid_when_revoked() {
        let mut share = sample();
        share.is_active = false;
        share.revoked_at = Some(Utc::now());
        assert!(!share.is_valid());
    }

    #[test]
    fn test_invalid_when_expired_even_if_active() {
        let mut share = sample();
        share.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(share.is_active);
        assert!(!share.is_valid());
    }

    #[test]
    fn test_future_expiry_is_still_valid() {
        let mut share = sample();
        share.expires_at = Some(Utc::now() + Duration::hours(24));
        assert!(share.is_valid());
    }
}
