//! Session-scoped plugin state
//!
//! The session supplies the list of plugins excluded for the current run and
//! receives the loaded and disabled sets once a load pass finishes, so the
//! rest of the application can read them without holding the registry.

use std::collections::{BTreeMap, BTreeSet};
use parking_lot::RwLock;
use super::name::PluginName;
use super::traits::PluginHandle;

/// Loaded plugins keyed by name
pub type LoadedSet = BTreeMap<PluginName, PluginHandle>;

/// Session/config collaborator
pub trait PluginSession: Send + Sync {
    /// Plugins excluded before any instantiation
    fn disabled_plugin_names(&self) -> BTreeSet<PluginName>;

    /// Publish the loaded plugins of the last load pass
    fn set_loaded_plugins(&self, loaded: LoadedSet);

    /// Publish the plugins whose stored record is disabled
    fn set_disabled_plugins(&self, disabled: Vec<PluginName>);

    fn loaded_plugins(&self) -> LoadedSet;

    fn disabled_plugins(&self) -> Vec<PluginName>;
}

#[derive(Default)]
struct SessionState {
    excluded: BTreeSet<PluginName>,
    loaded: LoadedSet,
    disabled: Vec<PluginName>,
}

/// In-process session store
#[derive(Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with the given plugins excluded
    pub fn with_excluded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let session = Self::new();
        for name in names {
            session.exclude(name);
        }
        session
    }

    /// Exclude a plugin for the rest of the session
    pub fn exclude<S: AsRef<str>>(&self, name: S) {
        let name = PluginName::new(name);
        if !name.is_empty() {
            self.state.write().excluded.insert(name);
        }
    }

    /// Lift a previous exclusion
    pub fn include<S: AsRef<str>>(&self, name: S) {
        self.state.write().excluded.remove(&PluginName::new(name));
    }
}

impl PluginSession for SessionContext {
    fn disabled_plugin_names(&self) -> BTreeSet<PluginName> {
        self.state.read().excluded.clone()
    }

    fn set_loaded_plugins(&self, loaded: LoadedSet) {
        self.state.write().loaded = loaded;
    }

    fn set_disabled_plugins(&self, disabled: Vec<PluginName>) {
        self.state.write().disabled = disabled;
    }

    fn loaded_plugins(&self) -> LoadedSet {
        self.state.read().loaded.clone()
    }

    fn disabled_plugins(&self) -> Vec<PluginName> {
        self.state.read().disabled.clone()
    }
}
