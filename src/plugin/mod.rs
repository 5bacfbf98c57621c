//! Plugin System Module
//!
//! Discovers plugins in the plugins directory, instantiates each at most once,
//! and decides per plugin whether it is loaded, excluded by configuration,
//! disabled in the store, or missing.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vault_plugins::events::EventDispatcher;
//! use vault_plugins::plugin::{builtin, FileBasedDiscovery, MemoryPluginStore, PluginRegistry, SessionContext};
//!
//! let mut registry = PluginRegistry::new(
//!     Box::new(FileBasedDiscovery::new("./plugins")),
//!     Box::new(builtin::builtin_factory()),
//!     Arc::new(MemoryPluginStore::new()),
//!     Arc::new(SessionContext::new()),
//! );
//!
//! let dispatcher = EventDispatcher::new();
//! let report = registry.load_all(&dispatcher);
//! println!("{} plugins loaded", report.loaded_count());
//! ```

pub mod traits;
pub mod error;
pub mod name;
pub mod registry;
pub mod compatibility;
pub mod discovery;
pub mod factory;
pub mod store;
pub mod session;
pub mod diagnostics;
pub mod outcome;
pub mod builtin;

#[cfg(test)]
pub mod tests;

// Re-export core types for easier access
pub use traits::{Plugin, PluginHandle, PluginInfo, PluginSubscriber};
pub use error::{PluginError, PluginResult};
pub use name::PluginName;

// Registry and collaborators
pub use registry::{PluginRegistry, SharedPluginRegistry};
pub use compatibility::VersionCompatibilityChecker;
pub use discovery::{FileBasedDiscovery, PluginDiscovery, StaticDiscovery};
pub use factory::{ConstructorTable, PluginConstructor, PluginFactory};
pub use store::{JsonFilePluginStore, MemoryPluginStore, PluginRecord, PluginStore};
pub use session::{LoadedSet, PluginSession, SessionContext};
pub use diagnostics::{DiagnosticEntry, DiagnosticLog, MemoryLog, StandardLog};
pub use outcome::{LoadOutcome, LoadReport};
