//! Subscriber Traits

use crate::events::error::NotificationResult;
use crate::events::event::Event;

/// Subscribing to this name delivers every event
pub const WILDCARD_EVENT: &str = "*";

/// Component that handles dispatched events
pub trait EventSubscriber: Send + Sync {
    /// Get the subscriber identifier (must be unique per dispatcher)
    fn subscriber_id(&self) -> &str;

    /// Event names this subscriber wants to receive
    fn subscribed_events(&self) -> Vec<String>;

    /// Handle an incoming event
    fn on_event(&self, event: &Event) -> NotificationResult<()>;

    /// Check if this subscriber should receive the event
    fn should_receive(&self, event: &Event) -> bool {
        self.subscribed_events()
            .iter()
            .any(|name| name == WILDCARD_EVENT || *name == event.name)
    }
}

/// Statistics about event delivery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Total events published
    pub events_published: u64,

    /// Total events delivered successfully
    pub events_delivered: u64,

    /// Total delivery failures
    pub delivery_failures: u64,
}
