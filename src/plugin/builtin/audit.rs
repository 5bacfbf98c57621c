//! Audit Trail Plugin
//!
//! Keeps a bounded in-memory trail of every application event.

use std::collections::VecDeque;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::events::{Event, WILDCARD_EVENT};
use crate::plugin::compatibility::get_api_version;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Plugin, PluginInfo};

pub const PLUGIN_NAME: &str = "Audit";

const DEFAULT_MAX_ENTRIES: usize = 100;

/// Persisted plugin data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSettings {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self { max_entries: DEFAULT_MAX_ENTRIES }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub event: String,
    pub source: String,
}

pub struct AuditPlugin {
    info: PluginInfo,
    settings: RwLock<AuditSettings>,
    trail: RwLock<VecDeque<AuditEntry>>,
}

impl AuditPlugin {
    pub fn new() -> Self {
        let info = PluginInfo::new(
            PLUGIN_NAME,
            "1.1.0",
            get_api_version(),
            "Records application events to an audit trail",
            "vault-plugins built-in",
        )
        .with_events([WILDCARD_EVENT]);

        Self {
            info,
            settings: RwLock::new(AuditSettings::default()),
            trail: RwLock::new(VecDeque::new()),
        }
    }

    /// Recorded entries, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.trail.read().iter().cloned().collect()
    }
}

impl Default for AuditPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for AuditPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn configure(&self, data: Option<&serde_json::Value>) -> PluginResult<()> {
        let settings = match data {
            Some(value) => serde_json::from_value::<AuditSettings>(value.clone())
                .map_err(|e| PluginError::configuration(format!("Invalid audit settings: {}", e)))?,
            None => AuditSettings::default(),
        };

        if settings.max_entries == 0 {
            return Err(PluginError::configuration("max_entries must be greater than zero"));
        }

        let mut trail = self.trail.write();
        while trail.len() > settings.max_entries {
            trail.pop_front();
        }
        *self.settings.write() = settings;
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&*self.settings.read()).unwrap_or_default()
    }

    fn on_event(&self, event: &Event) -> PluginResult<()> {
        let max_entries = self.settings.read().max_entries;
        let mut trail = self.trail.write();
        trail.push_back(AuditEntry {
            timestamp: event.timestamp,
            event: event.name.clone(),
            source: event.source.clone(),
        });
        while trail.len() > max_entries {
            trail.pop_front();
        }
        Ok(())
    }
}
