//! Activity event construction.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use moneta_core::config::notifications::NotificationsConfig;
use moneta_core::events::activity::{ActivityAction, EventStatus, UnifiedActivityEvent};
use moneta_core::types::resource::ResourceKind;
use moneta_entity::user::User;

/// A domain mutation to be turned into an activity event.
///
/// The caller is responsible for enrichment: both user records must
/// already be loaded before the builder is invoked — building performs
/// no I/O.
#[derive(Debug)]
pub struct ActivityInput<'a> {
    /// The kind of entity that was mutated.
    pub entity_type: ResourceKind,
    /// The mutated entity's ID.
    pub entity_id: Uuid,
    /// The mutated entity's human-readable name.
    pub entity_name: &'a str,
    /// The mutation performed.
    pub action: ActivityAction,
    /// The user who performed the mutation.
    pub actor: &'a User,
    /// The user whose data was mutated.
    pub target: &'a User,
    /// The domain service that performed the write.
    pub source_service: &'a str,
    /// Entity state before the mutation.
    pub old_values: Option<Value>,
    /// Entity state after the mutation.
    pub new_values: Option<Value>,
    /// Full entity payload, if the source service attaches one.
    pub entity_payload: Option<Value>,
    /// Free-form metadata.
    pub metadata: Option<Value>,
}

/// Constructs normalized activity events from domain mutations.
///
/// Pure and synchronous: attribution comes from identity equality, user
/// identities are snapshotted at call time, and every event is marked
/// audit-relevant. Notification routing follows the per-entity defaults.
#[derive(Debug, Clone)]
pub struct ActivityEventBuilder {
    notifications: NotificationsConfig,
}

impl ActivityEventBuilder {
    /// Creates a new builder with the given notification defaults.
    pub fn new(notifications: NotificationsConfig) -> Self {
        Self { notifications }
    }

    /// Build an event for a domain mutation.
    pub fn build(&self, input: ActivityInput<'_>) -> UnifiedActivityEvent {
        let is_own_action = input.actor.id == input.target.id;
        let actor_snapshot = input.actor.snapshot();
        let target_snapshot = input.target.snapshot();

        let description = render_description(
            input.action,
            input.entity_type,
            input.entity_name,
            is_own_action,
            actor_snapshot.visible_name(),
        );

        UnifiedActivityEvent {
            entity_type: input.entity_type,
            entity_id: input.entity_id,
            entity_name: input.entity_name.to_string(),
            action: input.action,
            description,
            actor_user_id: actor_snapshot.id,
            actor_user_name: actor_snapshot.visible_name().to_string(),
            target_user_id: target_snapshot.id,
            target_user_name: target_snapshot.visible_name().to_string(),
            actor_user: actor_snapshot,
            target_user: target_snapshot,
            source_service: input.source_service.to_string(),
            old_values: input.old_values,
            new_values: input.new_values,
            entity_payload: input.entity_payload,
            metadata: input.metadata,
            is_own_action,
            is_friend_activity: !is_own_action,
            requires_audit: true,
            requires_notification: self.notifications.notify(input.entity_type, input.action),
            status: EventStatus::Pending,
            timestamp: Utc::now(),
        }
    }
}

/// Renders the human-readable description, keyed by `(action, is_own_action)`.
fn render_description(
    action: ActivityAction,
    entity_type: ResourceKind,
    entity_name: &str,
    is_own_action: bool,
    actor_name: &str,
) -> String {
    let verb = action.verb();
    let noun = entity_type.noun();
    if is_own_action {
        format!("You {verb} {noun} '{entity_name}'")
    } else {
        format!("{actor_name} {verb} {noun} '{entity_name}' on your account")
    }
}
