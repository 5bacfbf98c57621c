//! Two-factor Authenticator Plugin
//!
//! Gates logins for users that enrolled in two-factor authentication. A
//! successful password login of an enrolled user leaves a pending
//! verification that the web layer must clear before granting access.

use std::collections::BTreeSet;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::events::{names, Event};
use crate::plugin::compatibility::get_api_version;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Plugin, PluginInfo};

pub const PLUGIN_NAME: &str = "Authenticator";

/// Persisted plugin data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatorData {
    /// Users enrolled in two-factor authentication
    #[serde(default)]
    pub enrolled_users: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct AuthenticatorState {
    data: AuthenticatorData,
    pending: BTreeSet<String>,
}

pub struct AuthenticatorPlugin {
    info: PluginInfo,
    state: RwLock<AuthenticatorState>,
}

impl AuthenticatorPlugin {
    pub fn new() -> Self {
        let info = PluginInfo::new(
            PLUGIN_NAME,
            "2.0.0",
            get_api_version(),
            "Two-factor authentication for user logins",
            "vault-plugins built-in",
        )
        .with_events([names::LOGIN_SUCCESS, names::LOGOUT]);

        Self {
            info,
            state: RwLock::new(AuthenticatorState::default()),
        }
    }

    pub fn enroll(&self, user: &str) {
        self.state.write().data.enrolled_users.insert(user.to_string());
    }

    pub fn unenroll(&self, user: &str) {
        let mut state = self.state.write();
        state.data.enrolled_users.remove(user);
        state.pending.remove(user);
    }

    pub fn is_enrolled(&self, user: &str) -> bool {
        self.state.read().data.enrolled_users.contains(user)
    }

    /// Whether the user's current session still awaits a second factor
    pub fn requires_verification(&self, user: &str) -> bool {
        self.state.read().pending.contains(user)
    }

    /// Clear a pending verification; false if none was pending
    pub fn complete_verification(&self, user: &str) -> bool {
        self.state.write().pending.remove(user)
    }
}

impl Default for AuthenticatorPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for AuthenticatorPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn configure(&self, data: Option<&serde_json::Value>) -> PluginResult<()> {
        let data = match data {
            Some(value) => serde_json::from_value::<AuthenticatorData>(value.clone())
                .map_err(|e| PluginError::configuration(format!("Invalid authenticator data: {}", e)))?,
            None => AuthenticatorData::default(),
        };
        self.state.write().data = data;
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.state.read().data).unwrap_or_default()
    }

    fn on_event(&self, event: &Event) -> PluginResult<()> {
        let mut state = self.state.write();
        match event.name.as_str() {
            names::LOGIN_SUCCESS if state.data.enrolled_users.contains(&event.source) => {
                debug!("Second factor required for '{}'", event.source);
                state.pending.insert(event.source.clone());
            }
            names::LOGOUT => {
                state.pending.remove(&event.source);
            }
            _ => {}
        }
        Ok(())
    }
}
