//! Plugin Factory
//!
//! Explicit name-to-constructor table. Only plugins registered here can be
//! instantiated, so the set of loadable plugins is known up front.

use std::collections::BTreeMap;
use super::error::{PluginError, PluginResult};
use super::name::PluginName;
use super::traits::Plugin;

/// Constructor for a plugin implementation
pub type PluginConstructor = fn() -> PluginResult<Box<dyn Plugin>>;

/// Construct-by-name collaborator used by the registry
pub trait PluginFactory: Send + Sync {
    /// Instantiate the plugin registered under `name`
    fn instantiate(&self, name: &PluginName) -> PluginResult<Box<dyn Plugin>>;

    /// Names this factory can construct
    fn known_plugins(&self) -> Vec<PluginName>;
}

/// Table-driven factory
#[derive(Default, Clone)]
pub struct ConstructorTable {
    constructors: BTreeMap<PluginName, PluginConstructor>,
}

impl ConstructorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any previous one for the same name
    pub fn register(&mut self, name: impl Into<PluginName>, constructor: PluginConstructor) -> &mut Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    pub fn with(mut self, name: impl Into<PluginName>, constructor: PluginConstructor) -> Self {
        self.register(name, constructor);
        self
    }

    pub fn contains(&self, name: &PluginName) -> bool {
        self.constructors.contains_key(name)
    }
}

impl PluginFactory for ConstructorTable {
    fn instantiate(&self, name: &PluginName) -> PluginResult<Box<dyn Plugin>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| PluginError::not_found(name.as_str()))?;

        let plugin = constructor().map_err(|e| match e {
            PluginError::InstantiationFailed { .. } => e,
            other => PluginError::instantiation_failed(name.as_str(), other.to_string()),
        })?;

        if plugin.name() != name {
            return Err(PluginError::instantiation_failed(
                name.as_str(),
                format!("constructor produced plugin '{}'", plugin.name()),
            ));
        }

        Ok(plugin)
    }

    fn known_plugins(&self) -> Vec<PluginName> {
        self.constructors.keys().cloned().collect()
    }
}
