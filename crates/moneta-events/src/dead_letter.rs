//! Bounded dead-letter sink for undeliverable events.

use std::collections::VecDeque;
use std::sync::Mutex;

use moneta_core::events::activity::UnifiedActivityEvent;

/// Holds events that could not be delivered, for later replay.
///
/// Bounded: when full, the oldest entry is discarded so the sink can
/// never grow without limit.
#[derive(Debug)]
pub struct DeadLetterSink {
    entries: Mutex<VecDeque<UnifiedActivityEvent>>,
    capacity: usize,
}

impl DeadLetterSink {
    /// Create a sink holding at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Add an undeliverable event, evicting the oldest if full.
    pub fn push(&self, event: UnifiedActivityEvent) {
        let mut entries = self.entries.lock().expect("dead letter lock poisoned");
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event);
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("dead letter lock poisoned").len()
    }

    /// Whether the sink is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every held event for replay, leaving the sink empty.
    pub fn drain(&self) -> Vec<UnifiedActivityEvent> {
        let mut entries = self.entries.lock().expect("dead letter lock poisoned");
        entries.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use moneta_core::events::activity::{ActivityAction, EventStatus, UserSnapshot};
    use moneta_core::types::resource::ResourceKind;
    use uuid::Uuid;

    fn event(n: i64) -> UnifiedActivityEvent {
        let user = UserSnapshot {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: None,
            display_name: None,
            avatar_url: None,
        };
        UnifiedActivityEvent {
            entity_type: ResourceKind::Expense,
            entity_id: Uuid::new_v4(),
            entity_name: format!("e{n}"),
            action: ActivityAction::Created,
            description: String::new(),
            actor_user_id: user.id,
            actor_user_name: "u".into(),
            actor_user: user.clone(),
            target_user_id: user.id,
            target_user_name: "u".into(),
            target_user: user,
            source_service: "test".into(),
            old_values: None,
            new_values: None,
            entity_payload: None,
            metadata: None,
            is_own_action: true,
            is_friend_activity: false,
            requires_audit: true,
            requires_notification: true,
            status: EventStatus::Failed,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_drain_empties_the_sink() {
        let sink = DeadLetterSink::new(8);
        sink.push(event(1));
        sink.push(event(2));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_oldest_is_evicted_when_full() {
        let sink = DeadLetterSink::new(2);
        sink.push(event(1));
        sink.push(event(2));
        sink.push(event(3));

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].entity_name, "e2");
        assert_eq!(drained[1].entity_name, "e3");
    }
}
