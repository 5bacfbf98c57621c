//! Per-plugin load results

use std::fmt;
use super::name::PluginName;
use super::traits::PluginHandle;

/// Result of trying to load a single plugin
#[derive(Clone)]
pub enum LoadOutcome {
    /// Plugin is loaded and enabled
    Loaded(PluginHandle),

    /// Excluded by session configuration; nothing was instantiated
    DisabledByConfig,

    /// Stored record is not enabled
    DisabledByData,

    /// No implementation registered under the name
    NotFound,

    /// Construction, configuration or compatibility check failed
    InstantiationFailed(String),

    /// The store could not answer
    Unavailable(String),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn handle(&self) -> Option<&PluginHandle> {
        match self {
            LoadOutcome::Loaded(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_handle(self) -> Option<PluginHandle> {
        match self {
            LoadOutcome::Loaded(handle) => Some(handle),
            _ => None,
        }
    }

    /// Short status label for reports
    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded(_) => "loaded",
            LoadOutcome::DisabledByConfig => "excluded",
            LoadOutcome::DisabledByData => "disabled",
            LoadOutcome::NotFound => "not found",
            LoadOutcome::InstantiationFailed(_) => "failed",
            LoadOutcome::Unavailable(_) => "unavailable",
        }
    }

    /// Failure detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            LoadOutcome::InstantiationFailed(message) | LoadOutcome::Unavailable(message) => {
                Some(message)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded(handle) => f.debug_tuple("Loaded").field(&handle.name()).finish(),
            LoadOutcome::DisabledByConfig => f.write_str("DisabledByConfig"),
            LoadOutcome::DisabledByData => f.write_str("DisabledByData"),
            LoadOutcome::NotFound => f.write_str("NotFound"),
            LoadOutcome::InstantiationFailed(m) => f.debug_tuple("InstantiationFailed").field(m).finish(),
            LoadOutcome::Unavailable(m) => f.debug_tuple("Unavailable").field(m).finish(),
        }
    }
}

/// Outcomes of a full load pass, in discovery order
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub outcomes: Vec<(PluginName, LoadOutcome)>,
}

impl LoadReport {
    pub fn push(&mut self, name: PluginName, outcome: LoadOutcome) {
        self.outcomes.push((name, outcome));
    }

    pub fn outcome(&self, name: &str) -> Option<&LoadOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn loaded_names(&self) -> Vec<&PluginName> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_loaded())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_loaded()).count()
    }

    /// Plugins that failed for a reason other than being switched off
    pub fn failures(&self) -> Vec<(&PluginName, &LoadOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    LoadOutcome::NotFound
                        | LoadOutcome::InstantiationFailed(_)
                        | LoadOutcome::Unavailable(_)
                )
            })
            .map(|(n, o)| (n, o))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
