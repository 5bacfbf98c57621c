//! Integration tests for the JSON file plugin store

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use vault_plugins::events::EventDispatcher;
use vault_plugins::plugin::{
    builtin, JsonFilePluginStore, LoadOutcome, PluginName, PluginRegistry, PluginStore, SessionContext,
    StaticDiscovery,
};

#[test]
fn test_missing_file_is_empty_store() {
    let temp = TempDir::new().unwrap();
    let store = JsonFilePluginStore::open(temp.path().join("plugins.json")).unwrap();

    assert!(store.records().unwrap().is_empty());
    assert!(store.list_enabled_names().unwrap().is_empty());
}

#[test]
fn test_changes_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plugins.json");

    {
        let store = JsonFilePluginStore::open(&path).unwrap();
        store.set_enabled(&PluginName::new("Audit"), true).unwrap();
        store
            .save_plugin_data(&PluginName::new("Audit"), json!({"max_entries": 10}))
            .unwrap();
        // Registers Ldap as a disabled record
        assert!(!store.is_enabled(&PluginName::new("ldap")).unwrap());
    }

    let store = JsonFilePluginStore::open(&path).unwrap();
    assert_eq!(store.list_enabled_names().unwrap(), vec![PluginName::new("Audit")]);
    assert_eq!(
        store.plugin_data(&PluginName::new("Audit")).unwrap(),
        Some(json!({"max_entries": 10}))
    );
    assert_eq!(store.records().unwrap().len(), 2);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_file_written_by_hand_is_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plugins.json");
    fs::write(
        &path,
        r#"{"plugins": [{"name": "authenticator", "enabled": true}, {"name": "Audit"}]}"#,
    )
    .unwrap();

    let store = JsonFilePluginStore::open(&path).unwrap();

    assert_eq!(store.list_enabled_names().unwrap(), vec![PluginName::new("Authenticator")]);
    let audit = store
        .records()
        .unwrap()
        .into_iter()
        .find(|r| r.name == "Audit")
        .unwrap();
    assert!(!audit.enabled);
    assert!(audit.available);
}

#[test]
fn test_corrupt_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plugins.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(JsonFilePluginStore::open(&path).is_err());
}

#[test]
fn test_registry_reconcile_persists() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plugins.json");
    {
        let store = JsonFilePluginStore::open(&path).unwrap();
        for name in ["Audit", "Totp"] {
            store.set_enabled(&PluginName::new(name), true).unwrap();
        }
    }

    let store = Arc::new(JsonFilePluginStore::open(&path).unwrap());
    let mut registry = PluginRegistry::new(
        Box::new(StaticDiscovery::new(["Audit", "Totp"])),
        Box::new(builtin::builtin_factory()),
        store,
        Arc::new(SessionContext::new()),
    );

    let report = registry.load_all(&EventDispatcher::new());
    assert!(matches!(report.outcome("Totp"), Some(LoadOutcome::NotFound)));
    registry.reconcile_availability().unwrap();

    let reopened = JsonFilePluginStore::open(&path).unwrap();
    let totp = reopened
        .records()
        .unwrap()
        .into_iter()
        .find(|r| r.name == "Totp")
        .unwrap();
    assert!(!totp.available);
    assert!(!totp.enabled);
    assert_eq!(reopened.list_enabled_names().unwrap(), vec![PluginName::new("Audit")]);
}
