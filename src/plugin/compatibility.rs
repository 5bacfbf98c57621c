//! Version Compatibility Checker
//!
//! Validates the API version a plugin was written against. The host API
//! version is generated at build time from
//! `package.metadata.vault-plugins.api_version` in Cargo.toml.

use crate::plugin::traits::PluginInfo;
use crate::plugin::error::{PluginError, PluginResult};

include!(concat!(env!("OUT_DIR"), "/version_api.rs"));

/// Get the host plugin API version (YYYYMMDD)
pub fn get_api_version() -> u32 {
    BASE_API_VERSION
}

/// Checker for plugin version compatibility
#[derive(Debug, Clone)]
pub struct VersionCompatibilityChecker {
    /// Current API version
    api_version: u32,
}

impl VersionCompatibilityChecker {
    /// Create a new version compatibility checker
    pub fn new(api_version: u32) -> Self {
        Self { api_version }
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Same major version (year) is compatible
    pub fn is_api_compatible(&self, plugin_api_version: u32) -> bool {
        self.get_major_version(self.api_version) == self.get_major_version(plugin_api_version)
    }

    /// Get major version (year) from API version
    pub fn get_major_version(&self, api_version: u32) -> u32 {
        api_version / 10000
    }

    /// Check plugin compatibility
    pub fn check_plugin_compatibility(&self, plugin_info: &PluginInfo) -> PluginResult<()> {
        if !self.is_api_compatible(plugin_info.api_version) {
            return Err(PluginError::version_incompatible(format!(
                "Plugin '{}' requires API version {} but current version is {}",
                plugin_info.name,
                plugin_info.api_version,
                self.api_version
            )));
        }
        Ok(())
    }
}

impl Default for VersionCompatibilityChecker {
    fn default() -> Self {
        Self::new(get_api_version())
    }
}
