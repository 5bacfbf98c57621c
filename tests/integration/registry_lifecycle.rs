//! Integration tests for the plugin load lifecycle
//!
//! Uses a real plugins directory on disk, the built-in plugin factory and an
//! in-memory store.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use vault_plugins::events::{names, Event, EventDispatcher};
use vault_plugins::plugin::{
    builtin, FileBasedDiscovery, LoadOutcome, MemoryLog, MemoryPluginStore, PluginName, PluginRecord,
    PluginRegistry, PluginSession, PluginStore, SessionContext, SharedPluginRegistry,
};

fn add_plugin(root: &Path, name: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}Plugin.so", name)), b"").unwrap();
}

fn enabled(name: &str, data: serde_json::Value) -> PluginRecord {
    PluginRecord {
        enabled: true,
        data,
        ..PluginRecord::new(PluginName::new(name))
    }
}

struct Fixture {
    _temp: TempDir,
    registry: PluginRegistry,
    store: Arc<MemoryPluginStore>,
    session: Arc<SessionContext>,
    log: Arc<MemoryLog>,
}

fn fixture(on_disk: &[&str], records: Vec<PluginRecord>, excluded: &[&str]) -> Fixture {
    let temp = TempDir::new().unwrap();
    for name in on_disk {
        add_plugin(temp.path(), name);
    }
    // Noise the discovery must ignore
    fs::write(temp.path().join("README"), b"").unwrap();
    fs::create_dir_all(temp.path().join(".cache")).unwrap();

    let store = Arc::new(MemoryPluginStore::with_records(records));
    let session = Arc::new(SessionContext::with_excluded(excluded));
    let log = Arc::new(MemoryLog::new());

    let registry = PluginRegistry::new(
        Box::new(FileBasedDiscovery::new(temp.path())),
        Box::new(builtin::builtin_factory()),
        store.clone(),
        session.clone(),
    )
    .with_diagnostics(log.clone());

    Fixture {
        _temp: temp,
        registry,
        store,
        session,
        log,
    }
}

#[test]
fn test_full_load_pass() {
    let mut f = fixture(
        &["Audit", "Authenticator", "Totp"],
        vec![
            enabled("Audit", json!({"max_entries": 5})),
            enabled("Totp", serde_json::Value::Null),
        ],
        &[],
    );
    let dispatcher = EventDispatcher::new();

    let report = f.registry.load_all(&dispatcher);

    let names: Vec<&str> = report.outcomes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Audit", "Authenticator", "Totp"]);
    assert_eq!(report.loaded_count(), 1);
    assert!(matches!(report.outcome("Authenticator"), Some(LoadOutcome::DisabledByData)));
    assert!(matches!(report.outcome("Totp"), Some(LoadOutcome::NotFound)));

    assert_eq!(f.session.loaded_plugins().len(), 1);
    assert_eq!(f.session.disabled_plugins(), vec![PluginName::new("Authenticator")]);
    assert_eq!(f.log.len(), 1);
    assert!(f.log.entries()[0].message.contains("\"Totp\""));

    // Stored data reached the plugin
    let audit = f.registry.get_loaded().get("Audit").unwrap();
    assert_eq!(audit.data(), json!({"max_entries": 5}));

    // Authenticator had no record and is now registered disabled
    let record = f.store.record(&PluginName::new("Authenticator")).unwrap();
    assert!(!record.enabled);
    assert!(record.available);
}

#[test]
fn test_loaded_plugins_receive_events() {
    let mut f = fixture(
        &["Audit", "Authenticator"],
        vec![
            enabled("Audit", serde_json::Value::Null),
            enabled("Authenticator", serde_json::Value::Null),
        ],
        &[],
    );
    let dispatcher = EventDispatcher::new();
    f.registry.load_all(&dispatcher);

    assert_eq!(dispatcher.subscriber_ids(), vec!["Audit", "Authenticator"]);

    // Audit subscribes to everything, Authenticator only to login/logout
    assert_eq!(dispatcher.notify(&Event::new(names::LOGIN_SUCCESS, "alice")), 2);
    assert_eq!(dispatcher.notify(&Event::new(names::ACCOUNT_PASSWORD_VIEW, "alice")), 1);
    assert_eq!(dispatcher.stats().events_delivered, 3);
}

#[test]
fn test_session_exclusion_skips_plugin() {
    let mut f = fixture(
        &["Audit", "Authenticator"],
        vec![
            enabled("Audit", serde_json::Value::Null),
            enabled("Authenticator", serde_json::Value::Null),
        ],
        &["authenticator"],
    );

    let report = f.registry.load_all(&EventDispatcher::new());

    assert!(matches!(report.outcome("Authenticator"), Some(LoadOutcome::DisabledByConfig)));
    assert!(!f.registry.is_loaded("Authenticator"));
    assert!(f.registry.get_disabled().is_empty());
}

#[test]
fn test_reconcile_after_plugin_removed() {
    let mut f = fixture(
        &["Audit"],
        vec![
            enabled("Audit", serde_json::Value::Null),
            enabled("Authenticator", serde_json::Value::Null),
        ],
        &[],
    );
    f.registry.load_all(&EventDispatcher::new());

    let marked = f.registry.reconcile_availability().unwrap();

    assert_eq!(marked, vec![PluginName::new("Authenticator")]);
    let record = f.store.record(&PluginName::new("Authenticator")).unwrap();
    assert!(!record.available);
    assert!(!record.enabled);
    assert!(f.store.record(&PluginName::new("Audit")).unwrap().available);
}

#[test]
fn test_invalid_stored_data_fails_plugin_only() {
    let mut f = fixture(
        &["Audit", "Authenticator"],
        vec![
            enabled("Audit", json!({"max_entries": 0})),
            enabled("Authenticator", serde_json::Value::Null),
        ],
        &[],
    );

    let report = f.registry.load_all(&EventDispatcher::new());

    assert!(matches!(report.outcome("Audit"), Some(LoadOutcome::InstantiationFailed(_))));
    assert!(f.registry.is_loaded("Authenticator"));
}

#[test]
fn test_missing_plugins_directory_loads_nothing() {
    let store = Arc::new(MemoryPluginStore::new());
    let log = Arc::new(MemoryLog::new());
    let mut registry = PluginRegistry::new(
        Box::new(FileBasedDiscovery::new("/nonexistent/vault/plugins")),
        Box::new(builtin::builtin_factory()),
        store,
        Arc::new(SessionContext::new()),
    )
    .with_diagnostics(log.clone());

    let report = registry.load_all(&EventDispatcher::new());

    assert!(report.is_empty());
    assert_eq!(log.entries()[0].context, "load_all");
}

#[test]
fn test_shared_registry_across_threads() {
    let f = fixture(
        &["Audit"],
        vec![enabled("Audit", serde_json::Value::Null)],
        &[],
    );
    let shared = SharedPluginRegistry::new(f.registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || shared.load_one("Audit").into_handle().unwrap())
        })
        .collect();
    let plugins: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(plugins.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(shared.loaded_names(), vec![PluginName::new("Audit")]);
}

#[test]
fn test_save_plugin_data_round_trip() {
    let mut f = fixture(
        &["Authenticator"],
        vec![enabled("Authenticator", json!({"enrolled_users": ["bob"]}))],
        &[],
    );
    f.registry.load_one("Authenticator");

    f.store
        .save_plugin_data(&PluginName::new("Authenticator"), serde_json::Value::Null)
        .unwrap();
    f.registry.save_plugin_data("Authenticator").unwrap();

    let data = f.store.plugin_data(&PluginName::new("Authenticator")).unwrap();
    assert_eq!(data, Some(json!({"enrolled_users": ["bob"]})));
}
