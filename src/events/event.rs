//! Event Types
//!
//! Events are identified by a dotted name. Subscribers select events by name,
//! so names are part of the plugin API and covered by the API version.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Well-known application event names
pub mod names {
    pub const LOGIN_SUCCESS: &str = "login.success";
    pub const LOGIN_FAILURE: &str = "login.failure";
    pub const LOGOUT: &str = "logout";
    pub const ACCOUNT_VIEW: &str = "account.view";
    pub const ACCOUNT_PASSWORD_VIEW: &str = "account.password.view";
    pub const CONFIG_CHANGED: &str = "config.changed";
}

/// An application event delivered to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Dotted event name, e.g. `login.success`
    pub name: String,

    /// Component or user that raised the event
    pub source: String,

    /// Event specific data
    #[serde(default)]
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Local>,
}

impl Event {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, source: S) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            payload: serde_json::Value::Null,
            timestamp: Local::now(),
        }
    }
}
