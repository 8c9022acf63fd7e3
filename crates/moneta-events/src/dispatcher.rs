//! Asynchronous event dispatch over a bounded worker pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{Mutex, Semaphore, watch};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use moneta_core::config::events::{EventsConfig, OverflowPolicy};
use moneta_core::events::activity::{EventStatus, UnifiedActivityEvent};

use crate::dead_letter::DeadLetterSink;
use crate::transport::EventTransport;

/// Hands built events to the transport without ever blocking or failing
/// the caller's primary operation.
///
/// Events are queued onto a bounded channel and published by a small
/// worker pool. Delivery is at-most-once, best-effort: serialization and
/// transport failures are logged and dead-lettered, never raised. When
/// the queue is full the configured [`OverflowPolicy`] applies. No
/// ordering is guaranteed across entities; same-entity order tracks
/// submission order but is not guaranteed under backpressure.
///
/// Must be created inside a Tokio runtime: construction spawns the
/// dispatch loop.
pub struct EventDispatcher {
    tx: mpsc::Sender<UnifiedActivityEvent>,
    transport: Arc<dyn EventTransport>,
    channel: String,
    policy: OverflowPolicy,
    dead_letters: Arc<DeadLetterSink>,
    shutdown_tx: watch::Sender<bool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl EventDispatcher {
    /// Creates a dispatcher and starts its dispatch loop.
    pub fn new(transport: Arc<dyn EventTransport>, config: &EventsConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let dead_letters = Arc::new(DeadLetterSink::new(config.dead_letter_capacity));

        let handle = tokio::spawn(dispatch_loop(
            rx,
            Arc::clone(&transport),
            config.channel.clone(),
            config.workers,
            Arc::clone(&dead_letters),
            shutdown_rx,
            config.shutdown_grace_seconds,
        ));

        Self {
            tx,
            transport,
            channel: config.channel.clone(),
            policy: config.overflow_policy,
            dead_letters,
            shutdown_tx,
            loop_handle: Mutex::new(Some(handle)),
        }
    }

    /// Enqueue an event for delivery. Never returns an error: overflow
    /// follows the configured policy, and a stopped dispatcher
    /// dead-letters the event.
    pub async fn send(&self, event: UnifiedActivityEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => match self.policy {
                OverflowPolicy::CallerRuns => {
                    warn!(
                        entity_id = %event.entity_id,
                        "Dispatch queue full, publishing on caller"
                    );
                    publish_event(&*self.transport, &self.channel, event, &self.dead_letters)
                        .await;
                }
                OverflowPolicy::DropAndLog => {
                    warn!(
                        entity_id = %event.entity_id,
                        entity_type = %event.entity_type,
                        "Dispatch queue full, dropping event"
                    );
                    self.dead_letters.push(event);
                }
            },
            Err(TrySendError::Closed(event)) => {
                error!(
                    entity_id = %event.entity_id,
                    "Dispatcher stopped, dead-lettering event"
                );
                self.dead_letters.push(event);
            }
        }
    }

    /// The dead-letter sink holding undeliverable events for replay.
    pub fn dead_letters(&self) -> &Arc<DeadLetterSink> {
        &self.dead_letters
    }

    /// Stop the dispatch loop and wait for in-flight publishes to finish,
    /// bounded by the configured grace period. Events still queued are
    /// lost (at-most-once).
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.loop_handle.lock().await.take() {
            let _ = handle.await;
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("channel", &self.channel)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

async fn dispatch_loop(
    mut rx: mpsc::Receiver<UnifiedActivityEvent>,
    transport: Arc<dyn EventTransport>,
    channel: String,
    workers: usize,
    dead_letters: Arc<DeadLetterSink>,
    mut shutdown_rx: watch::Receiver<bool>,
    grace_seconds: u64,
) {
    let semaphore = Arc::new(Semaphore::new(workers));

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            maybe = rx.recv() => {
                let Some(event) = maybe else { break };
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let transport = Arc::clone(&transport);
                let channel = channel.clone();
                let dead_letters = Arc::clone(&dead_letters);
                tokio::spawn(async move {
                    let _permit = permit;
                    publish_event(&*transport, &channel, event, &dead_letters).await;
                });
            }
        }
    }

    // Wait for in-flight publishes before returning.
    let _ = tokio::time::timeout(
        Duration::from_secs(grace_seconds),
        semaphore.acquire_many(workers as u32),
    )
    .await;
}

async fn publish_event(
    transport: &dyn EventTransport,
    channel: &str,
    mut event: UnifiedActivityEvent,
    dead_letters: &DeadLetterSink,
) {
    event.status = EventStatus::Published;
    match serde_json::to_value(&event) {
        Ok(payload) => {
            if let Err(e) = transport.publish(channel, payload).await {
                error!(
                    error = %e,
                    entity_id = %event.entity_id,
                    "Failed to publish activity event"
                );
                event.status = EventStatus::Failed;
                dead_letters.push(event);
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize activity event");
            event.status = EventStatus::Failed;
            dead_letters.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    use moneta_core::error::AppError;
    use moneta_core::events::activity::{ActivityAction, UserSnapshot};
    use moneta_core::result::AppResult;
    use moneta_core::types::resource::ResourceKind;

    use crate::transport::MemoryTransport;

    fn event(name: &str) -> UnifiedActivityEvent {
        let user = UserSnapshot {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: None,
            display_name: None,
            avatar_url: None,
        };
        UnifiedActivityEvent {
            entity_type: ResourceKind::Expense,
            entity_id: Uuid::new_v4(),
            entity_name: name.to_string(),
            action: ActivityAction::Created,
            description: String::new(),
            actor_user_id: user.id,
            actor_user_name: "alice".into(),
            actor_user: user.clone(),
            target_user_id: user.id,
            target_user_name: "alice".into(),
            target_user: user,
            source_service: "expense-service".into(),
            old_values: None,
            new_values: None,
            entity_payload: None,
            metadata: None,
            is_own_action: true,
            is_friend_activity: false,
            requires_audit: true,
            requires_notification: true,
            status: EventStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let transport = Arc::new(MemoryTransport::new(16));
        let mut rx = transport.subscribe("activity-events").await;
        let dispatcher = EventDispatcher::new(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            &EventsConfig::default(),
        );

        dispatcher.send(event("Lunch")).await;

        let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .unwrap();
        assert_eq!(payload["entity_name"], "Lunch");
        assert_eq!(payload["status"], "published");
        assert_eq!(payload["requires_audit"], true);
    }

    #[tokio::test]
    async fn test_transport_failure_is_contained_and_dead_lettered() {
        #[derive(Debug)]
        struct FailingTransport;

        #[async_trait]
        impl EventTransport for FailingTransport {
            async fn publish(&self, _: &str, _: serde_json::Value) -> AppResult<()> {
                Err(AppError::internal("broker unavailable"))
            }
        }

        let dispatcher = EventDispatcher::new(Arc::new(FailingTransport), &EventsConfig::default());

        // send never surfaces the failure.
        dispatcher.send(event("Rent")).await;

        let dead = Arc::clone(dispatcher.dead_letters());
        assert!(wait_until(|| dead.len() == 1).await);

        let drained = dead.drain();
        assert_eq!(drained[0].entity_name, "Rent");
        assert_eq!(drained[0].status, EventStatus::Failed);
    }

    /// A transport whose first publish parks forever, occupying the only
    /// worker; later publishes complete instantly and are recorded.
    #[derive(Debug, Default)]
    struct StallingTransport {
        calls: AtomicUsize,
        recorded: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventTransport for StallingTransport {
        async fn publish(&self, _: &str, payload: serde_json::Value) -> AppResult<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            self.recorded
                .lock()
                .unwrap()
                .push(payload["entity_name"].as_str().unwrap_or("").to_string());
            Ok(())
        }
    }

    fn tiny_config(policy: OverflowPolicy) -> EventsConfig {
        EventsConfig {
            workers: 1,
            queue_capacity: 1,
            overflow_policy: policy,
            ..EventsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_overflow_drop_policy_dead_letters_the_event() {
        let transport = Arc::new(StallingTransport::default());
        let dispatcher = EventDispatcher::new(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            &tiny_config(OverflowPolicy::DropAndLog),
        );

        // "a" occupies the single worker forever; "b" is pulled by the
        // loop and parks waiting for a permit.
        dispatcher.send(event("a")).await;
        assert!(wait_until(|| transport.calls.load(Ordering::SeqCst) == 1).await);
        dispatcher.send(event("b")).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // "c" fills the queue slot; "d" overflows and is dropped.
        dispatcher.send(event("c")).await;
        dispatcher.send(event("d")).await;

        let drained = dispatcher.dead_letters().drain();
        assert!(drained.iter().any(|e| e.entity_name == "d"));
        assert!(
            drained
                .iter()
                .all(|e| e.entity_name == "c" || e.entity_name == "d")
        );
    }

    #[tokio::test]
    async fn test_overflow_caller_runs_policy_preserves_delivery() {
        let transport = Arc::new(StallingTransport::default());
        let dispatcher = EventDispatcher::new(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            &tiny_config(OverflowPolicy::CallerRuns),
        );

        dispatcher.send(event("a")).await;
        assert!(wait_until(|| transport.calls.load(Ordering::SeqCst) == 1).await);
        dispatcher.send(event("b")).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        dispatcher.send(event("c")).await;

        // The queue is full: this publish runs inline on the caller.
        dispatcher.send(event("d")).await;

        let recorded = transport.recorded.lock().unwrap().clone();
        assert_eq!(recorded, vec!["d".to_string()]);
        assert!(dispatcher.dead_letters().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let transport = Arc::new(MemoryTransport::new(16));
        let dispatcher = EventDispatcher::new(
            Arc::clone(&transport) as Arc<dyn EventTransport>,
            &EventsConfig::default(),
        );

        dispatcher.shutdown().await;

        // Sends after shutdown are absorbed; once the queue fills they
        // fall through to the overflow policy and are dead-lettered.
        for _ in 0..=EventsConfig::default().queue_capacity {
            dispatcher.send(event("late")).await;
        }
        assert!(!dispatcher.dead_letters().is_empty());
    }
}
