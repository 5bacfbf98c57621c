//! Event Dispatcher
//!
//! Keeps subscribers in attach order and delivers events synchronously.
//! A failing subscriber is logged and counted but never stops delivery to
//! the remaining subscribers.

use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use log::{debug, warn};

use crate::events::error::{NotificationError, NotificationResult};
use crate::events::event::Event;
use crate::events::traits::{DeliveryStats, EventSubscriber};

pub struct EventDispatcher {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
    stats: Mutex<DeliveryStats>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            stats: Mutex::new(DeliveryStats::default()),
        }
    }

    /// Attach a subscriber; ids must be unique
    pub fn attach(&self, subscriber: Arc<dyn EventSubscriber>) -> NotificationResult<()> {
        let mut subscribers = self.subscribers.write();
        let id = subscriber.subscriber_id().to_string();

        if subscribers.iter().any(|s| s.subscriber_id() == id) {
            return Err(NotificationError::subscriber_already_exists(id));
        }

        debug!("Attached subscriber '{}' for events {:?}", id, subscriber.subscribed_events());
        subscribers.push(subscriber);
        Ok(())
    }

    /// Detach a subscriber by id
    pub fn detach(&self, subscriber_id: &str) -> NotificationResult<()> {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.subscriber_id() != subscriber_id);

        if subscribers.len() == before {
            return Err(NotificationError::subscriber_not_found(subscriber_id));
        }
        Ok(())
    }

    /// Deliver an event to every interested subscriber.
    ///
    /// Returns the number of subscribers that handled the event successfully.
    pub fn notify(&self, event: &Event) -> usize {
        // Snapshot so handlers may attach or notify without deadlocking
        let subscribers: Vec<Arc<dyn EventSubscriber>> = self.subscribers.read().clone();

        let mut delivered = 0u64;
        let mut failures = 0u64;

        for subscriber in subscribers.iter().filter(|s| s.should_receive(event)) {
            match subscriber.on_event(event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failures += 1;
                    warn!(
                        "Subscriber '{}' failed to handle event '{}': {}",
                        subscriber.subscriber_id(),
                        event.name,
                        e
                    );
                }
            }
        }

        let mut stats = self.stats.lock();
        stats.events_published += 1;
        stats.events_delivered += delivered;
        stats.delivery_failures += failures;

        delivered as usize
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.read().iter().any(|s| s.subscriber_id() == subscriber_id)
    }

    pub fn subscriber_ids(&self) -> Vec<String> {
        self.subscribers
            .read()
            .iter()
            .map(|s| s.subscriber_id().to_string())
            .collect()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats.lock().clone()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
