//! Core Plugin Traits
//!
//! Defines the interface every plugin implements and the adapter that attaches
//! a loaded plugin to the event dispatcher.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::events::{Event, EventSubscriber, NotificationError, NotificationResult};
use super::error::PluginResult;
use super::name::PluginName;

/// Plugin metadata and information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin name (unique identifier)
    pub name: PluginName,

    /// Plugin version
    pub version: String,

    /// API version this plugin targets (YYYYMMDD)
    pub api_version: u32,

    /// Human-readable description
    pub description: String,

    /// Plugin author
    pub author: String,

    /// Event names the plugin subscribes to
    #[serde(default)]
    pub events: Vec<String>,
}

impl PluginInfo {
    /// Create a new PluginInfo
    pub fn new(
        name: impl Into<PluginName>,
        version: impl Into<String>,
        api_version: u32,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            api_version,
            description: description.into(),
            author: author.into(),
            events: Vec::new(),
        }
    }

    /// Subscribe to the given event names
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }
}

/// Core plugin interface that all plugins must implement.
///
/// Instances are shared behind `Arc` once loaded, so state changes go through
/// interior mutability.
pub trait Plugin: Send + Sync {
    /// Get plugin metadata information
    fn info(&self) -> &PluginInfo;

    /// Apply data previously stored for this plugin.
    ///
    /// Called with `None` when nothing has been stored yet.
    fn configure(&self, data: Option<&serde_json::Value>) -> PluginResult<()>;

    /// Current plugin data, suitable for persisting
    fn data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Handle an application event the plugin subscribed to
    fn on_event(&self, event: &Event) -> PluginResult<()>;

    fn name(&self) -> &PluginName {
        &self.info().name
    }
}

/// Shared handle to a loaded plugin
pub type PluginHandle = Arc<dyn Plugin>;

/// Adapts a plugin handle to the dispatcher's subscriber interface
pub struct PluginSubscriber {
    plugin: PluginHandle,
}

impl PluginSubscriber {
    pub fn new(plugin: PluginHandle) -> Self {
        Self { plugin }
    }

    pub fn plugin(&self) -> &PluginHandle {
        &self.plugin
    }
}

impl EventSubscriber for PluginSubscriber {
    fn subscriber_id(&self) -> &str {
        self.plugin.name().as_str()
    }

    fn subscribed_events(&self) -> Vec<String> {
        self.plugin.info().events.clone()
    }

    fn on_event(&self, event: &Event) -> NotificationResult<()> {
        self.plugin
            .on_event(event)
            .map_err(|e| NotificationError::delivery_failed(self.subscriber_id(), e.to_string()))
    }
}
