//! The unified activity event and its supporting value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::resource::ResourceKind;

/// The mutation that produced an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// A record was created.
    Created,
    /// A record was updated.
    Updated,
    /// A record was deleted.
    Deleted,
}

impl ActivityAction {
    /// Past-tense verb used when rendering descriptions.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        self.verb()
    }
}

/// Downstream processing status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Built but not yet handed to the transport.
    Pending,
    /// Handed to the transport.
    Published,
    /// Publication failed; the event may sit in the dead-letter sink.
    Failed,
}

/// An immutable, denormalized copy of a user's identity, captured when an
/// event is built.
///
/// The live user record may change after the event is emitted; audit must
/// reflect point-in-time identity, not a live reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// The user's ID.
    pub id: Uuid,
    /// Login name at capture time.
    pub username: String,
    /// Email at capture time.
    pub email: Option<String>,
    /// Display name at capture time.
    pub display_name: Option<String>,
    /// Avatar URL at capture time.
    pub avatar_url: Option<String>,
}

impl UserSnapshot {
    /// The name to show for this user: display name, falling back to the
    /// login name.
    pub fn visible_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// The single normalized event shape emitted for every tracked mutation.
///
/// Carries attribution (actor vs target) and routing flags for the
/// downstream audit/notification consumers. Transient: this core does not
/// persist events; persistence is a consumer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedActivityEvent {
    /// The kind of entity that was mutated.
    pub entity_type: ResourceKind,
    /// The mutated entity's ID.
    pub entity_id: Uuid,
    /// The mutated entity's human-readable name.
    pub entity_name: String,
    /// The mutation performed.
    pub action: ActivityAction,
    /// Rendered human-readable description of the mutation.
    pub description: String,
    /// The user who performed the mutation.
    pub actor_user_id: Uuid,
    /// The acting user's visible name at build time.
    pub actor_user_name: String,
    /// Point-in-time identity snapshot of the actor.
    pub actor_user: UserSnapshot,
    /// The user whose data was mutated.
    pub target_user_id: Uuid,
    /// The target user's visible name at build time.
    pub target_user_name: String,
    /// Point-in-time identity snapshot of the target.
    pub target_user: UserSnapshot,
    /// The domain service that performed the write.
    pub source_service: String,
    /// Entity state before the mutation, if captured.
    pub old_values: Option<serde_json::Value>,
    /// Entity state after the mutation, if captured.
    pub new_values: Option<serde_json::Value>,
    /// Full entity payload, if the source service chose to attach one.
    pub entity_payload: Option<serde_json::Value>,
    /// Free-form metadata attached by the source service.
    pub metadata: Option<serde_json::Value>,
    /// Whether the actor is the data owner.
    pub is_own_action: bool,
    /// Whether the mutation was performed by a delegated friend.
    pub is_friend_activity: bool,
    /// Whether the event must be recorded by the audit consumer.
    pub requires_audit: bool,
    /// Whether the event should be surfaced by the notification consumer.
    pub requires_notification: bool,
    /// Downstream processing status.
    pub status: EventStatus,
    /// When the event was built.
    pub timestamp: DateTime<Utc>,
}
