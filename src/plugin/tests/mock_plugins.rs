//! Mock Collaborators for Testing
//!
//! Counting factory and store wrappers let tests assert how often the
//! registry instantiates plugins or queries persistence.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;

use crate::events::Event;
use crate::plugin::compatibility::get_api_version;
use crate::plugin::diagnostics::MemoryLog;
use crate::plugin::discovery::StaticDiscovery;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::factory::PluginFactory;
use crate::plugin::name::PluginName;
use crate::plugin::registry::PluginRegistry;
use crate::plugin::session::SessionContext;
use crate::plugin::store::{MemoryPluginStore, PluginRecord, PluginStore};
use crate::plugin::traits::{Plugin, PluginInfo};

/// Mock plugin recording configuration and events
pub struct MockPlugin {
    info: PluginInfo,
    configured_with: Mutex<Option<serde_json::Value>>,
    received: Mutex<Vec<String>>,
    fail_events: bool,
}

impl MockPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            info: PluginInfo::new(name, "1.0.0", get_api_version(), "Mock plugin for testing", "Test Author"),
            configured_with: Mutex::new(None),
            received: Mutex::new(Vec::new()),
            fail_events: false,
        }
    }

    pub fn with_events(mut self, events: &[&str]) -> Self {
        self.info = self.info.with_events(events.iter().copied());
        self
    }

    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.info.api_version = api_version;
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }

    pub fn configured_with(&self) -> Option<serde_json::Value> {
        self.configured_with.lock().clone()
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

impl Plugin for MockPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn configure(&self, data: Option<&serde_json::Value>) -> PluginResult<()> {
        if let Some(value) = data {
            if value.get("reject").is_some() {
                return Err(PluginError::configuration("rejected by mock"));
            }
        }
        *self.configured_with.lock() = data.cloned();
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        self.configured_with.lock().clone().unwrap_or(serde_json::Value::Null)
    }

    fn on_event(&self, event: &Event) -> PluginResult<()> {
        if self.fail_events {
            return Err(PluginError::instantiation_failed(self.info.name.as_str(), "event failure"));
        }
        self.received.lock().push(event.name.clone());
        Ok(())
    }
}

/// How the counting factory builds a given name
#[derive(Clone)]
pub enum MockBehaviour {
    Ok,
    Broken,
    ApiVersion(u32),
    Events(Vec<String>),
    FailingEvents(Vec<String>),
}

/// Factory producing mock plugins and counting constructions
#[derive(Clone, Default)]
pub struct CountingFactory {
    behaviours: BTreeMap<PluginName, MockBehaviour>,
    instantiations: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut factory = Self::default();
        for name in names {
            factory.behaviours.insert(PluginName::new(name), MockBehaviour::Ok);
        }
        factory
    }

    pub fn with(mut self, name: &str, behaviour: MockBehaviour) -> Self {
        self.behaviours.insert(PluginName::new(name), behaviour);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.instantiations)
    }
}

impl PluginFactory for CountingFactory {
    fn instantiate(&self, name: &PluginName) -> PluginResult<Box<dyn Plugin>> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        match self.behaviours.get(name) {
            None => Err(PluginError::not_found(name.as_str())),
            Some(MockBehaviour::Broken) => {
                Err(PluginError::instantiation_failed(name.as_str(), "malformed implementation"))
            }
            Some(MockBehaviour::Ok) => Ok(Box::new(MockPlugin::new(name.as_str()))),
            Some(MockBehaviour::ApiVersion(version)) => {
                Ok(Box::new(MockPlugin::new(name.as_str()).with_api_version(*version)))
            }
            Some(MockBehaviour::Events(events)) => {
                let events: Vec<&str> = events.iter().map(String::as_str).collect();
                Ok(Box::new(MockPlugin::new(name.as_str()).with_events(&events)))
            }
            Some(MockBehaviour::FailingEvents(events)) => {
                let events: Vec<&str> = events.iter().map(String::as_str).collect();
                Ok(Box::new(
                    MockPlugin::new(name.as_str()).with_events(&events).failing_events(),
                ))
            }
        }
    }

    fn known_plugins(&self) -> Vec<PluginName> {
        self.behaviours.keys().cloned().collect()
    }
}

/// Call counters for [`CountingStore`]
#[derive(Debug, Default)]
pub struct StoreCalls {
    pub is_enabled: AtomicUsize,
    pub list_enabled: AtomicUsize,
    pub mark_unavailable: Mutex<Vec<PluginName>>,
}

impl StoreCalls {
    pub fn is_enabled_count(&self) -> usize {
        self.is_enabled.load(Ordering::SeqCst)
    }

    pub fn list_enabled_count(&self) -> usize {
        self.list_enabled.load(Ordering::SeqCst)
    }

    pub fn marked(&self) -> Vec<PluginName> {
        self.mark_unavailable.lock().clone()
    }
}

/// Memory store wrapper that counts queries and can simulate failures
pub struct CountingStore {
    inner: MemoryPluginStore,
    calls: Arc<StoreCalls>,
    failing: BTreeSet<PluginName>,
}

impl CountingStore {
    /// Store with the given plugins enabled
    pub fn with_enabled<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = names.into_iter().map(|name| PluginRecord {
            enabled: true,
            ..PluginRecord::new(PluginName::new(name))
        });
        Self {
            inner: MemoryPluginStore::with_records(records),
            calls: Arc::new(StoreCalls::default()),
            failing: BTreeSet::new(),
        }
    }

    /// Queries for `name` fail with a store error
    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(PluginName::new(name));
        self
    }

    pub fn calls(&self) -> Arc<StoreCalls> {
        Arc::clone(&self.calls)
    }

    pub fn inner(&self) -> &MemoryPluginStore {
        &self.inner
    }

    fn check(&self, name: &PluginName) -> PluginResult<()> {
        if self.failing.contains(name) {
            return Err(PluginError::store("database unavailable"));
        }
        Ok(())
    }
}

impl PluginStore for CountingStore {
    fn is_enabled(&self, name: &PluginName) -> PluginResult<bool> {
        self.calls.is_enabled.fetch_add(1, Ordering::SeqCst);
        self.check(name)?;
        self.inner.is_enabled(name)
    }

    fn mark_unavailable(&self, name: &PluginName) -> PluginResult<()> {
        self.calls.mark_unavailable.lock().push(name.clone());
        self.inner.mark_unavailable(name)
    }

    fn list_enabled_names(&self) -> PluginResult<Vec<PluginName>> {
        self.calls.list_enabled.fetch_add(1, Ordering::SeqCst);
        self.inner.list_enabled_names()
    }

    fn plugin_data(&self, name: &PluginName) -> PluginResult<Option<serde_json::Value>> {
        self.inner.plugin_data(name)
    }

    fn save_plugin_data(&self, name: &PluginName, data: serde_json::Value) -> PluginResult<()> {
        self.inner.save_plugin_data(name, data)
    }

    fn set_enabled(&self, name: &PluginName, enabled: bool) -> PluginResult<()> {
        self.inner.set_enabled(name, enabled)
    }

    fn records(&self) -> PluginResult<Vec<PluginRecord>> {
        self.inner.records()
    }
}

/// Registry wired to mock collaborators, with handles to inspect them
pub struct TestHarness {
    pub registry: PluginRegistry,
    pub instantiations: Arc<AtomicUsize>,
    pub store_calls: Arc<StoreCalls>,
    pub store: Arc<CountingStore>,
    pub session: Arc<SessionContext>,
    pub log: Arc<MemoryLog>,
}

impl TestHarness {
    pub fn new(discovered: &[&str], factory: CountingFactory, store: CountingStore, session: SessionContext) -> Self {
        let instantiations = factory.counter();
        let store_calls = store.calls();
        let store = Arc::new(store);
        let session = Arc::new(session);
        let log = Arc::new(MemoryLog::new());

        let registry = PluginRegistry::new(
            Box::new(StaticDiscovery::new(discovered.iter().copied())),
            Box::new(factory),
            store.clone(),
            session.clone(),
        )
        .with_diagnostics(log.clone());

        Self {
            registry,
            instantiations,
            store_calls,
            store,
            session,
            log,
        }
    }

    /// Rebuild the registry with extra builder options
    pub fn map_registry<F>(self, f: F) -> Self
    where
        F: FnOnce(PluginRegistry) -> PluginRegistry,
    {
        Self {
            registry: f(self.registry),
            ..self
        }
    }

    pub fn instantiation_count(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }
}
