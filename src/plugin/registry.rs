//! Plugin Registry
//!
//! Discovers plugins, instantiates at most one instance per name, and tracks
//! which plugins are loaded and which are disabled.
//!
//! Per plugin the registry moves through
//! `Discovered -> {DisabledByConfig | NotFound/InstantiationFailed | DisabledByData | Loaded}`.
//! Every state is final for the lifetime of the registry; repeated loads of a
//! loaded plugin return the same handle. Individual failures are logged and
//! returned as [`LoadOutcome`] values, never propagated.

use std::collections::BTreeMap;
use std::sync::Arc;
use log::{debug, info};
use parking_lot::RwLock;

use crate::events::{EventDispatcher, NotificationError};
use super::compatibility::VersionCompatibilityChecker;
use super::diagnostics::{DiagnosticLog, StandardLog};
use super::discovery::PluginDiscovery;
use super::error::{PluginError, PluginResult};
use super::factory::PluginFactory;
use super::name::PluginName;
use super::outcome::{LoadOutcome, LoadReport};
use super::session::{LoadedSet, PluginSession};
use super::store::PluginStore;
use super::traits::{PluginHandle, PluginSubscriber};

/// Registry for managing plugin instances
pub struct PluginRegistry {
    discovery: Box<dyn PluginDiscovery>,
    factory: Box<dyn PluginFactory>,
    store: Arc<dyn PluginStore>,
    session: Arc<dyn PluginSession>,
    diagnostics: Arc<dyn DiagnosticLog>,
    compatibility: VersionCompatibilityChecker,

    /// Enabled plugins
    loaded: LoadedSet,

    /// Instances created but not loaded (introspection, disabled plugins)
    inspected: BTreeMap<PluginName, PluginHandle>,

    /// Plugins whose stored record is not enabled, in encounter order
    disabled: Vec<PluginName>,

    /// Final non-loaded outcomes
    settled: BTreeMap<PluginName, LoadOutcome>,

    /// Memoized enabled names from the store
    enabled_names: Option<Vec<PluginName>>,
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new(
        discovery: Box<dyn PluginDiscovery>,
        factory: Box<dyn PluginFactory>,
        store: Arc<dyn PluginStore>,
        session: Arc<dyn PluginSession>,
    ) -> Self {
        Self {
            discovery,
            factory,
            store,
            session,
            diagnostics: Arc::new(StandardLog),
            compatibility: VersionCompatibilityChecker::default(),
            loaded: LoadedSet::new(),
            inspected: BTreeMap::new(),
            disabled: Vec::new(),
            settled: BTreeMap::new(),
            enabled_names: None,
        }
    }

    /// Route recoverable failures to the given log
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticLog>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Check plugins against a specific host API version
    pub fn with_compatibility(mut self, compatibility: VersionCompatibilityChecker) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// List plugin names present in the plugins directory
    pub fn discover(&self) -> PluginResult<Vec<PluginName>> {
        self.discovery.discover_plugins()
    }

    /// Load a single plugin.
    ///
    /// Order of checks: session exclusion, loaded cache, earlier final
    /// outcome, instantiation, API compatibility, stored enabled flag,
    /// stored data.
    pub fn load_one<S: AsRef<str>>(&mut self, name: S) -> LoadOutcome {
        let name = PluginName::new(name);

        if self.session.disabled_plugin_names().contains(&name) {
            debug!("Plugin '{}' excluded by session", name);
            return LoadOutcome::DisabledByConfig;
        }

        if let Some(handle) = self.loaded.get(&name) {
            return LoadOutcome::Loaded(Arc::clone(handle));
        }

        if let Some(outcome) = self.settled.get(&name) {
            return outcome.clone();
        }

        let outcome = self.try_load(&name);
        if !outcome.is_loaded() {
            self.settled.insert(name, outcome.clone());
        }
        outcome
    }

    fn try_load(&mut self, name: &PluginName) -> LoadOutcome {
        let plugin = match self.instance_for(name, "load_one") {
            Ok(plugin) => plugin,
            Err(PluginError::NotFound { .. }) => return LoadOutcome::NotFound,
            Err(e) => return LoadOutcome::InstantiationFailed(e.to_string()),
        };

        if let Err(e) = self.compatibility.check_plugin_compatibility(plugin.info()) {
            self.report("load_one", name, &e);
            return LoadOutcome::InstantiationFailed(e.to_string());
        }

        match self.store.is_enabled(name) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Plugin '{}' is disabled in the store", name);
                if !self.disabled.contains(name) {
                    self.disabled.push(name.clone());
                }
                return LoadOutcome::DisabledByData;
            }
            Err(e) => {
                self.report("load_one", name, &e);
                return LoadOutcome::Unavailable(e.to_string());
            }
        }

        let configured = self
            .store
            .plugin_data(name)
            .and_then(|data| plugin.configure(data.as_ref()));

        match configured {
            Ok(()) => {}
            Err(e @ PluginError::Store { .. }) | Err(e @ PluginError::Io { .. }) => {
                self.report("load_one", name, &e);
                return LoadOutcome::Unavailable(e.to_string());
            }
            Err(e) => {
                self.report("load_one", name, &e);
                return LoadOutcome::InstantiationFailed(e.to_string());
            }
        }

        self.inspected.remove(name);
        self.loaded.insert(name.clone(), Arc::clone(&plugin));
        info!("Loaded plugin '{}' v{}", name, plugin.info().version);

        LoadOutcome::Loaded(plugin)
    }

    /// Existing instance for `name`, or a new one from the factory.
    ///
    /// New instances are kept so a plugin is never constructed twice.
    fn instance_for(&mut self, name: &PluginName, context: &str) -> PluginResult<PluginHandle> {
        if let Some(handle) = self.loaded.get(name).or_else(|| self.inspected.get(name)) {
            return Ok(Arc::clone(handle));
        }

        match self.factory.instantiate(name) {
            Ok(plugin) => {
                let handle: PluginHandle = Arc::from(plugin);
                self.inspected.insert(name.clone(), Arc::clone(&handle));
                Ok(handle)
            }
            Err(e) => {
                self.report(context, name, &e);
                Err(e)
            }
        }
    }

    fn report(&self, context: &str, name: &PluginName, error: &PluginError) {
        let message = match error {
            PluginError::NotFound { .. } => format!("Unable to load plugin \"{}\": not found", name),
            PluginError::InstantiationFailed { .. } => error.to_string(),
            other => format!("Unable to load plugin \"{}\": {}", name, other),
        };
        self.diagnostics.write(context, &message);
    }

    /// Discover and load every plugin, attach loaded plugins to the
    /// dispatcher and publish the results to the session.
    pub fn load_all(&mut self, dispatcher: &EventDispatcher) -> LoadReport {
        let mut report = LoadReport::default();

        let names = match self.discover() {
            Ok(names) => names,
            Err(e) => {
                self.diagnostics.write("load_all", &e.to_string());
                Vec::new()
            }
        };

        for name in names {
            let outcome = self.load_one(&name);

            if let Some(handle) = outcome.handle() {
                let subscriber = Arc::new(PluginSubscriber::new(Arc::clone(handle)));
                match dispatcher.attach(subscriber) {
                    Ok(()) => {}
                    Err(NotificationError::SubscriberAlreadyExists(_)) => {
                        debug!("Plugin '{}' already attached to dispatcher", name);
                    }
                    Err(e) => self.diagnostics.write("load_all", &e.to_string()),
                }
            }

            report.push(name, outcome);
        }

        self.session.set_loaded_plugins(self.loaded.clone());
        self.session.set_disabled_plugins(self.disabled.clone());

        info!(
            "Plugin load pass complete: {} discovered, {} loaded, {} disabled",
            report.len(),
            report.loaded_count(),
            self.disabled.len()
        );

        report
    }

    /// Loaded plugins
    pub fn get_loaded(&self) -> &LoadedSet {
        &self.loaded
    }

    /// Plugins whose stored record is disabled
    pub fn get_disabled(&self) -> &[PluginName] {
        &self.disabled
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(&PluginName::new(name))
    }

    /// Instance of a plugin for introspection.
    ///
    /// Ignores session exclusions and the stored enabled flag, and does not
    /// add the plugin to the loaded set.
    pub fn get_info<S: AsRef<str>>(&mut self, name: S) -> Option<PluginHandle> {
        let name = PluginName::new(name);
        self.instance_for(&name, "get_info").ok()
    }

    /// Enabled plugin names from the store, queried once and then cached
    pub fn refresh_enabled_names(&mut self) -> PluginResult<Vec<PluginName>> {
        if let Some(names) = &self.enabled_names {
            return Ok(names.clone());
        }

        let names = self.store.list_enabled_names()?;
        debug!("Store reports {} enabled plugins", names.len());
        self.enabled_names = Some(names.clone());
        Ok(names)
    }

    /// Mark enabled-but-not-loaded plugins unavailable in the store.
    ///
    /// Returns the names that were marked.
    pub fn reconcile_availability(&mut self) -> PluginResult<Vec<PluginName>> {
        let enabled = self.refresh_enabled_names()?;
        let mut marked = Vec::new();

        for name in enabled.into_iter().filter(|n| !self.loaded.contains_key(n)) {
            match self.store.mark_unavailable(&name) {
                Ok(()) => {
                    info!("Plugin '{}' is enabled but not loaded; marked unavailable", name);
                    marked.push(name);
                }
                Err(e) => self.report("reconcile_availability", &name, &e),
            }
        }

        Ok(marked)
    }

    /// Persist the current data of a loaded plugin
    pub fn save_plugin_data(&self, name: &str) -> PluginResult<()> {
        let name = PluginName::new(name);
        let plugin = self
            .loaded
            .get(&name)
            .ok_or_else(|| PluginError::not_found(name.as_str()))?;
        self.store.save_plugin_data(&name, plugin.data())
    }

    /// Names the factory can construct
    pub fn known_plugins(&self) -> Vec<PluginName> {
        self.factory.known_plugins()
    }

    pub fn store(&self) -> &Arc<dyn PluginStore> {
        &self.store
    }

    pub fn session(&self) -> &Arc<dyn PluginSession> {
        &self.session
    }
}

/// Thread-safe plugin registry wrapper
#[derive(Clone)]
pub struct SharedPluginRegistry {
    inner: Arc<RwLock<PluginRegistry>>,
}

impl SharedPluginRegistry {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Get the inner registry for direct access
    pub fn inner(&self) -> &Arc<RwLock<PluginRegistry>> {
        &self.inner
    }

    pub fn load_one(&self, name: &str) -> LoadOutcome {
        self.inner.write().load_one(name)
    }

    pub fn load_all(&self, dispatcher: &EventDispatcher) -> LoadReport {
        self.inner.write().load_all(dispatcher)
    }

    pub fn get_info(&self, name: &str) -> Option<PluginHandle> {
        self.inner.write().get_info(name)
    }

    pub fn loaded_names(&self) -> Vec<PluginName> {
        self.inner.read().get_loaded().keys().cloned().collect()
    }

    pub fn disabled_names(&self) -> Vec<PluginName> {
        self.inner.read().get_disabled().to_vec()
    }
}
