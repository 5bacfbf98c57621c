//! Plugin Error Types
//!
//! Error taxonomy for plugin discovery, instantiation and persistence.
//! Every variant raised while loading a single plugin is recoverable at the
//! registry boundary; only the caller decides whether absence matters.

use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// No implementation is registered for the plugin name
    #[error("Plugin not found: {plugin_name}")]
    NotFound { plugin_name: String },

    /// Plugin constructor or configuration failed
    #[error("Unable to load plugin \"{plugin_name}\": {message}")]
    InstantiationFailed { plugin_name: String, message: String },

    /// Plugin targets an incompatible API version
    #[error("Version compatibility error: {message}")]
    VersionIncompatible { message: String },

    /// Persistence layer failure
    #[error("Plugin store error: {message}")]
    Store { message: String },

    /// Plugin directory could not be scanned
    #[error("Plugin discovery error: {message}")]
    Discovery { message: String },

    /// Configuration error
    #[error("Plugin configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem error
    #[error("IO error: {message}")]
    Io { message: String },
}

impl PluginError {
    /// Create a plugin not found error
    pub fn not_found<S: Into<String>>(plugin_name: S) -> Self {
        Self::NotFound { plugin_name: plugin_name.into() }
    }

    /// Create an instantiation error
    pub fn instantiation_failed<N: Into<String>, M: Into<String>>(plugin_name: N, message: M) -> Self {
        Self::InstantiationFailed {
            plugin_name: plugin_name.into(),
            message: message.into(),
        }
    }

    /// Create a version incompatible error
    pub fn version_incompatible<S: Into<String>>(message: S) -> Self {
        Self::VersionIncompatible { message: message.into() }
    }

    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store { message: message.into() }
    }

    /// Create a discovery error
    pub fn discovery<S: Into<String>>(message: S) -> Self {
        Self::Discovery { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Check if the error comes from the plugin implementation itself
    pub fn is_instantiation_error(&self) -> bool {
        matches!(self,
            PluginError::NotFound { .. } |
            PluginError::InstantiationFailed { .. } |
            PluginError::VersionIncompatible { .. }
        )
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::Io { message: err.to_string() }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::store(format!("JSON error: {}", err))
    }
}
