//! Application Event Dispatcher
//!
//! Synchronous publish/subscribe hub used to notify plugins of application
//! events (logins, account access, configuration changes).
//!
//! # Architecture
//!
//! - **Subscribers**: components that handle events; loaded plugins are attached
//!   by the plugin registry
//! - **EventDispatcher**: routes each event to every subscriber interested in it
//! - **Events**: named messages with a source and a JSON payload
//!
//! # Example Usage
//!
//! ```no_run
//! use vault_plugins::events::{Event, EventDispatcher, names};
//!
//! let dispatcher = EventDispatcher::new();
//! let delivered = dispatcher.notify(&Event::new(names::LOGIN_SUCCESS, "alice"));
//! assert_eq!(delivered, 0);
//! ```

pub mod error;
pub mod event;
pub mod traits;
pub mod dispatcher;


pub use error::{NotificationError, NotificationResult};
pub use event::{Event, names};
pub use traits::{EventSubscriber, DeliveryStats, WILDCARD_EVENT};
pub use dispatcher::EventDispatcher;
