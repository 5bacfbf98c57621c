//! Plugin Persistence
//!
//! Stored per-plugin records: whether the plugin is enabled, whether it was
//! available the last time the application tried to load it, and the opaque
//! data the plugin keeps between runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use super::error::{PluginError, PluginResult};
use super::name::PluginName;

/// Stored state of one plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub name: PluginName,

    /// Administrator has enabled the plugin
    #[serde(default)]
    pub enabled: bool,

    /// Plugin implementation was found the last time it was expected
    #[serde(default = "default_available")]
    pub available: bool,

    /// Plugin owned data
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_available() -> bool {
    true
}

impl PluginRecord {
    /// New records start disabled until an administrator enables them
    pub fn new(name: PluginName) -> Self {
        Self {
            name,
            enabled: false,
            available: true,
            data: serde_json::Value::Null,
        }
    }
}

/// Persistence collaborator for plugin records
pub trait PluginStore: Send + Sync {
    /// Check whether the stored record marks the plugin enabled.
    ///
    /// An unknown plugin is registered as a new disabled record and reported
    /// as not enabled. A record previously marked unavailable is marked
    /// available again, since its implementation has just been found.
    fn is_enabled(&self, name: &PluginName) -> PluginResult<bool>;

    /// Flag a plugin as expected-but-missing
    fn mark_unavailable(&self, name: &PluginName) -> PluginResult<()>;

    /// Names of all enabled plugin records
    fn list_enabled_names(&self) -> PluginResult<Vec<PluginName>>;

    /// Stored plugin data, if any
    fn plugin_data(&self, name: &PluginName) -> PluginResult<Option<serde_json::Value>>;

    /// Replace a plugin's stored data
    fn save_plugin_data(&self, name: &PluginName, data: serde_json::Value) -> PluginResult<()>;

    /// Administrative toggle; creates the record if needed
    fn set_enabled(&self, name: &PluginName, enabled: bool) -> PluginResult<()>;

    /// Snapshot of every record, ordered by name
    fn records(&self) -> PluginResult<Vec<PluginRecord>>;
}

type RecordMap = BTreeMap<PluginName, PluginRecord>;

fn check_enabled(records: &mut RecordMap, name: &PluginName) -> (bool, bool) {
    match records.get_mut(name) {
        Some(record) => {
            let changed = !record.available;
            record.available = true;
            (record.enabled, changed)
        }
        None => {
            info!("Registering new plugin record: {}", name);
            records.insert(name.clone(), PluginRecord::new(name.clone()));
            (false, true)
        }
    }
}

fn enabled_names(records: &RecordMap) -> Vec<PluginName> {
    records
        .values()
        .filter(|r| r.enabled)
        .map(|r| r.name.clone())
        .collect()
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryPluginStore {
    records: Mutex<RecordMap>,
}

impl MemoryPluginStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I: IntoIterator<Item = PluginRecord>>(records: I) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        Self { records: Mutex::new(records) }
    }

    pub fn record(&self, name: &PluginName) -> Option<PluginRecord> {
        self.records.lock().get(name).cloned()
    }
}

impl PluginStore for MemoryPluginStore {
    fn is_enabled(&self, name: &PluginName) -> PluginResult<bool> {
        Ok(check_enabled(&mut self.records.lock(), name).0)
    }

    fn mark_unavailable(&self, name: &PluginName) -> PluginResult<()> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(name)
            .ok_or_else(|| PluginError::store(format!("No record for plugin '{}'", name)))?;
        record.available = false;
        record.enabled = false;
        Ok(())
    }

    fn list_enabled_names(&self) -> PluginResult<Vec<PluginName>> {
        Ok(enabled_names(&self.records.lock()))
    }

    fn plugin_data(&self, name: &PluginName) -> PluginResult<Option<serde_json::Value>> {
        Ok(self
            .records
            .lock()
            .get(name)
            .map(|r| r.data.clone())
            .filter(|d| !d.is_null()))
    }

    fn save_plugin_data(&self, name: &PluginName, data: serde_json::Value) -> PluginResult<()> {
        let mut records = self.records.lock();
        records
            .entry(name.clone())
            .or_insert_with(|| PluginRecord::new(name.clone()))
            .data = data;
        Ok(())
    }

    fn set_enabled(&self, name: &PluginName, enabled: bool) -> PluginResult<()> {
        let mut records = self.records.lock();
        records
            .entry(name.clone())
            .or_insert_with(|| PluginRecord::new(name.clone()))
            .enabled = enabled;
        Ok(())
    }

    fn records(&self) -> PluginResult<Vec<PluginRecord>> {
        Ok(self.records.lock().values().cloned().collect())
    }
}

/// On-disk file layout for [`JsonFilePluginStore`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    plugins: Vec<PluginRecord>,
}

/// JSON file backed store.
///
/// The file is read once on open and rewritten after every change by writing
/// a sibling temporary file and renaming it over the original.
#[derive(Debug)]
pub struct JsonFilePluginStore {
    path: PathBuf,
    records: Mutex<RecordMap>,
}

impl JsonFilePluginStore {
    /// Open a store file; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> PluginResult<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                PluginError::store(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
                PluginError::store(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            file.plugins.into_iter().map(|r| (r.name.clone(), r)).collect()
        } else {
            debug!("Plugin store {} does not exist yet", path.display());
            RecordMap::new()
        };

        Ok(Self { path, records: Mutex::new(records) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &RecordMap) -> PluginResult<()> {
        let file = StoreFile {
            plugins: records.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let written = fs::File::create(&tmp_path)
            .and_then(|mut tmp| {
                tmp.write_all(content.as_bytes())?;
                tmp.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!("Saved {} plugin records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Apply `change` to a copy of the records; the copy replaces the
    /// in-memory records only once it has been written to disk.
    fn update<F>(&self, change: F) -> PluginResult<()>
    where
        F: FnOnce(&mut RecordMap) -> PluginResult<bool>,
    {
        let mut records = self.records.lock();
        let mut staged = records.clone();
        if change(&mut staged)? {
            self.persist(&staged)?;
            *records = staged;
        }
        Ok(())
    }
}

impl PluginStore for JsonFilePluginStore {
    fn is_enabled(&self, name: &PluginName) -> PluginResult<bool> {
        let mut enabled = false;
        self.update(|records| {
            let (is_enabled, changed) = check_enabled(records, name);
            enabled = is_enabled;
            Ok(changed)
        })?;
        Ok(enabled)
    }

    fn mark_unavailable(&self, name: &PluginName) -> PluginResult<()> {
        self.update(|records| {
            let record = records
                .get_mut(name)
                .ok_or_else(|| PluginError::store(format!("No record for plugin '{}'", name)))?;
            record.available = false;
            record.enabled = false;
            Ok(true)
        })
    }

    fn list_enabled_names(&self) -> PluginResult<Vec<PluginName>> {
        Ok(enabled_names(&self.records.lock()))
    }

    fn plugin_data(&self, name: &PluginName) -> PluginResult<Option<serde_json::Value>> {
        Ok(self
            .records
            .lock()
            .get(name)
            .map(|r| r.data.clone())
            .filter(|d| !d.is_null()))
    }

    fn save_plugin_data(&self, name: &PluginName, data: serde_json::Value) -> PluginResult<()> {
        self.update(|records| {
            records
                .entry(name.clone())
                .or_insert_with(|| PluginRecord::new(name.clone()))
                .data = data;
            Ok(true)
        })
    }

    fn set_enabled(&self, name: &PluginName, enabled: bool) -> PluginResult<()> {
        self.update(|records| {
            records
                .entry(name.clone())
                .or_insert_with(|| PluginRecord::new(name.clone()))
                .enabled = enabled;
            Ok(true)
        })
    }

    fn records(&self) -> PluginResult<Vec<PluginRecord>> {
        Ok(self.records.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn enabled_record(name: &str) -> PluginRecord {
        PluginRecord {
            enabled: true,
            ..PluginRecord::new(PluginName::new(name))
        }
    }

    #[test]
    fn test_unknown_plugin_registered_disabled() {
        let store = MemoryPluginStore::new();
        let name = PluginName::new("ldap");

        assert!(!store.is_enabled(&name).unwrap());

        let record = store.record(&name).unwrap();
        assert!(!record.enabled);
        assert!(record.available);
    }

    #[test]
    fn test_enabled_check_restores_availability() {
        let mut record = enabled_record("Audit");
        record.available = false;
        let store = MemoryPluginStore::with_records([record]);
        let name = PluginName::new("Audit");

        assert!(store.is_enabled(&name).unwrap());
        assert!(store.record(&name).unwrap().available);
    }

    #[test]
    fn test_mark_unavailable_disables() {
        let store = MemoryPluginStore::with_records([enabled_record("Totp")]);
        let name = PluginName::new("Totp");

        store.mark_unavailable(&name).unwrap();

        let record = store.record(&name).unwrap();
        assert!(!record.available);
        assert!(!record.enabled);
        assert!(store.list_enabled_names().unwrap().is_empty());
    }

    #[test]
    fn test_mark_unavailable_unknown_is_error() {
        let store = MemoryPluginStore::new();
        let result = store.mark_unavailable(&PluginName::new("Ghost"));
        assert!(matches!(result, Err(PluginError::Store { .. })));
    }

    #[test]
    fn test_list_enabled_names() {
        let store = MemoryPluginStore::with_records([
            enabled_record("B"),
            PluginRecord::new(PluginName::new("C")),
            enabled_record("A"),
        ]);
        let names = store.list_enabled_names().unwrap();
        assert_eq!(names, vec![PluginName::new("A"), PluginName::new("B")]);
    }

    #[test]
    fn test_plugin_data_roundtrip() {
        let store = MemoryPluginStore::new();
        let name = PluginName::new("Authenticator");

        assert_eq!(store.plugin_data(&name).unwrap(), None);
        store.save_plugin_data(&name, json!({"users": ["alice"]})).unwrap();
        assert_eq!(store.plugin_data(&name).unwrap(), Some(json!({"users": ["alice"]})));
    }

    #[test]
    fn test_file_store_persists_changes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("plugins.json");
        let name = PluginName::new("Audit");

        {
            let store = JsonFilePluginStore::open(&path).unwrap();
            assert!(!store.is_enabled(&name).unwrap());
            store.set_enabled(&name, true).unwrap();
        }

        let reopened = JsonFilePluginStore::open(&path).unwrap();
        assert!(reopened.is_enabled(&name).unwrap());
        assert_eq!(reopened.list_enabled_names().unwrap(), vec![name]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_write_leaves_records_unchanged() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = JsonFilePluginStore::open(blocker.join("plugins.json")).unwrap();
        let name = PluginName::new("Audit");

        assert!(store.set_enabled(&name, true).is_err());
        assert!(store.is_enabled(&name).is_err());

        assert!(store.list_enabled_names().unwrap().is_empty());
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plugins.json");
        let name = PluginName::new("Audit");
        let store = JsonFilePluginStore::open(&path).unwrap();
        store.set_enabled(&name, true).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.mark_unavailable(&name).is_err());
        assert!(!temp.path().join("plugins.json.tmp").exists());
        assert_eq!(store.list_enabled_names().unwrap(), vec![name]);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plugins.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFilePluginStore::open(&path);
        assert!(matches!(result, Err(PluginError::Store { .. })));
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let file: StoreFile = serde_json::from_str(r#"{"plugins":[{"name":"ldap"}]}"#).unwrap();
        let record = &file.plugins[0];
        assert_eq!(record.name, "Ldap");
        assert!(!record.enabled);
        assert!(record.available);
        assert!(record.data.is_null());
    }
}
