//! Plugin Discovery
//!
//! Finds candidate plugins in the plugins directory by naming convention:
//! plugin `Foo` lives in `Foo/` and ships an implementation marker file named
//! `FooPlugin` (optionally with extensions, e.g. `FooPlugin.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, trace};
use super::error::{PluginError, PluginResult};
use super::name::PluginName;

/// Plugin discovery trait for listing available plugins
pub trait PluginDiscovery: Send + Sync {
    /// Discover all available plugin names, sorted
    fn discover_plugins(&self) -> PluginResult<Vec<PluginName>>;

    /// Get the plugin directory being scanned
    fn plugin_directory(&self) -> &Path;
}

/// File-based plugin discovery implementation
#[derive(Debug, Clone)]
pub struct FileBasedDiscovery {
    plugin_directory: PathBuf,
}

impl FileBasedDiscovery {
    /// Create a discovery over the given directory.
    ///
    /// The directory is not required to exist yet; scanning a missing
    /// directory reports a discovery error.
    pub fn new<P: AsRef<Path>>(plugin_directory: P) -> Self {
        Self {
            plugin_directory: plugin_directory.as_ref().to_path_buf(),
        }
    }

    /// Check whether a directory entry name qualifies as a plugin directory
    fn is_candidate_name(entry_name: &str) -> bool {
        // Names are trimmed on canonicalization, so padded names would alias
        !entry_name.is_empty() && !entry_name.contains('.') && entry_name.trim() == entry_name
    }

    /// Check for `<Name>Plugin` or `<Name>Plugin.<ext>` inside the plugin directory
    fn has_implementation(dir: &Path, entry_name: &str) -> bool {
        let stem = format!("{}Plugin", entry_name);
        let with_ext = format!("{}.", stem);

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read plugin directory {}: {}", dir.display(), e);
                return false;
            }
        };

        entries.filter_map(Result::ok).any(|entry| {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            (&*file_name == stem.as_str() || file_name.starts_with(with_ext.as_str())) && entry.path().is_file()
        })
    }
}

impl PluginDiscovery for FileBasedDiscovery {
    fn discover_plugins(&self) -> PluginResult<Vec<PluginName>> {
        let entries = fs::read_dir(&self.plugin_directory).map_err(|e| {
            PluginError::discovery(format!(
                "Failed to read plugin directory {}: {}",
                self.plugin_directory.display(),
                e
            ))
        })?;

        let mut plugins = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| {
                PluginError::discovery(format!("Failed to read directory entry: {}", e))
            })?;

            let entry_name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if !Self::is_candidate_name(&entry_name) || !path.is_dir() {
                trace!("Skipping non-plugin entry: {}", path.display());
                continue;
            }

            if Self::has_implementation(&path, &entry_name) {
                plugins.push(PluginName::new(&entry_name));
            } else {
                debug!("Directory {} has no {}Plugin file", path.display(), entry_name);
            }
        }

        plugins.sort();
        plugins.dedup();

        debug!(
            "Discovered {} plugins in {}",
            plugins.len(),
            self.plugin_directory.display()
        );

        Ok(plugins)
    }

    fn plugin_directory(&self) -> &Path {
        &self.plugin_directory
    }
}

/// Discovery over a fixed list of names, for hosts without a plugins directory
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    names: Vec<PluginName>,
}

impl StaticDiscovery {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<PluginName> = names.into_iter().map(PluginName::new).collect();
        names.sort();
        names.dedup();
        Self { names }
    }
}

impl PluginDiscovery for StaticDiscovery {
    fn discover_plugins(&self) -> PluginResult<Vec<PluginName>> {
        Ok(self.names.clone())
    }

    fn plugin_directory(&self) -> &Path {
        Path::new("")
    }
}
