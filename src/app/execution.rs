//! Command handlers for each CLI action

use anyhow::{Context, Result};
use log::{info, warn};

use crate::cli::Action;
use crate::config::PluginsConfig;
use crate::display::{self, ColourManager};
use crate::events::EventDispatcher;
use crate::plugin::{PluginName, PluginRegistry, PluginStore};

/// Run the selected action against a freshly built registry
pub fn run_action(action: &Action, plugins: &PluginsConfig, colours: &ColourManager) -> Result<()> {
    let mut registry = super::initialization::build_registry(plugins)?;

    let output = match action {
        Action::Load => load_plugins(&mut registry, colours),
        Action::List => list_plugins(&registry, colours)?,
        Action::Info(name) => plugin_info(&mut registry, name)?,
        Action::Reconcile => reconcile(&mut registry, colours)?,
        Action::Enable(name) => set_enabled(&registry, plugins, name, true, colours)?,
        Action::Disable(name) => set_enabled(&registry, plugins, name, false, colours)?,
    };

    print!("{}", output);
    Ok(())
}

/// Load every discovered plugin and render the outcome table
pub fn load_plugins(registry: &mut PluginRegistry, colours: &ColourManager) -> String {
    let dispatcher = EventDispatcher::new();
    let report = registry.load_all(&dispatcher);

    if report.is_empty() {
        return format!("{}\n", colours.warning("No plugins found."));
    }

    let mut output = String::new();
    output.push_str(&format!("{}\n", colours.highlight("Plugins:")));
    output.push_str(&display::format_compact_table(
        &["Plugin", "Version", "Detail", "Status"],
        &display::plugin_status_rows(&report, colours),
    ));
    output.push_str(&format!(
        "\n{}\n",
        display::format_load_summary(&report, registry.get_disabled().len())
    ));
    output
}

/// Discovered plugins with their stored state, without loading anything
pub fn list_plugins(registry: &PluginRegistry, colours: &ColourManager) -> Result<String> {
    let discovered = registry.discover().context("Failed to discover plugins")?;
    let records = registry.store().records().context("Failed to read plugin records")?;
    let known = registry.known_plugins();

    if discovered.is_empty() {
        return Ok(format!("{}\n", colours.warning("No plugins found.")));
    }

    let rows: Vec<Vec<String>> = discovered
        .iter()
        .map(|name| {
            let record = records.iter().find(|r| &r.name == name);
            let state = match record {
                Some(r) if r.enabled => "enabled",
                Some(_) => "disabled",
                None => "new",
            };
            vec![
                name.to_string(),
                if known.contains(name) { "yes" } else { "no" }.to_string(),
                record.map_or("-", |r| if r.available { "yes" } else { "no" }).to_string(),
                colours.status(state).to_string(),
            ]
        })
        .collect();

    let mut output = format!("{}\n", colours.highlight("Discovered plugins:"));
    output.push_str(&display::format_compact_table(
        &["Plugin", "Implemented", "Available", "State"],
        &rows,
    ));
    Ok(output)
}

/// Describe one plugin; it is instantiated but not loaded
pub fn plugin_info(registry: &mut PluginRegistry, name: &str) -> Result<String> {
    let plugin = registry
        .get_info(name)
        .ok_or_else(|| anyhow::anyhow!("Plugin '{}' is not available", PluginName::new(name)))?;

    let records = registry.store().records()?;
    let record = records.iter().find(|r| &r.name == plugin.name());

    Ok(display::format_compact_table(
        &["Field", "Value"],
        &display::plugin_detail_rows(plugin.info(), record),
    ))
}

/// Load plugins, then flag enabled-but-missing plugins as unavailable
pub fn reconcile(registry: &mut PluginRegistry, colours: &ColourManager) -> Result<String> {
    let mut output = load_plugins(registry, colours);
    let marked = registry
        .reconcile_availability()
        .context("Failed to reconcile plugin availability")?;

    if marked.is_empty() {
        output.push_str(&format!("{}\n", colours.success("All enabled plugins are loaded.")));
    } else {
        for name in &marked {
            output.push_str(&format!("{} {}\n", colours.warning("Marked unavailable:"), name));
        }
    }
    Ok(output)
}

/// Toggle the stored enabled flag of a plugin
pub fn set_enabled(
    registry: &PluginRegistry,
    plugins: &PluginsConfig,
    name: &str,
    enabled: bool,
    colours: &ColourManager,
) -> Result<String> {
    let name = PluginName::new(name);

    if !registry.known_plugins().contains(&name) {
        warn!("Plugin '{}' has no implementation; the record is updated anyway", name);
    }
    if plugins.store.is_none() {
        warn!("No plugin store configured; the change only lasts for this run");
    }

    registry
        .store()
        .set_enabled(&name, enabled)
        .with_context(|| format!("Failed to update plugin '{}'", name))?;

    let state = if enabled { "enabled" } else { "disabled" };
    info!("Plugin '{}' {}", name, state);
    Ok(format!("Plugin {} {}\n", name, colours.status(state)))
}
