//! Application initialization and configuration

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

use crate::config::PluginsConfig;
use crate::plugin::{
    builtin, FileBasedDiscovery, JsonFilePluginStore, MemoryPluginStore, PluginRegistry, PluginStore,
    SessionContext,
};
use crate::{cli, config, display, logging};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    use log::LevelFilter;
    use std::str::FromStr;

    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        config
            .get_log_level("base", "console-level")
            .context("Invalid console-level in configuration")?
            .unwrap_or(LevelFilter::Warn)
    };

    let format = if args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value("base", "log-format") {
            Some(format_str) => logging::LogFormat::from_str(format_str).map_err(|e| anyhow::anyhow!(e))?,
            None => logging::LogFormat::Text,
        }
    };

    let log_file_path = args.log_file.clone().or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config
            .get_log_level("base", "file-log-level")
            .context("Invalid file-log-level in configuration")?,
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), level) => {
            let level = level.unwrap_or(console_level);
            (logging::LogDestination::Both(file_path), Some(level))
        }
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Create a ColourManager from CLI arguments
pub fn create_colour_manager(args: &cli::Args) -> display::ColourManager {
    display::ColourManager::from_args(args.no_color)
}

/// Merge `[plugins]` configuration with CLI overrides
pub fn resolve_plugins_config(args: &cli::Args, config: &config::ConfigManager) -> Result<PluginsConfig> {
    let mut plugins = config.get_plugins_config()?;

    if let Some(dir) = &args.plugins_dir {
        plugins.directory = dir.clone();
    }
    if let Some(store) = &args.store {
        plugins.store = Some(store.clone());
    }
    for name in &args.disable {
        if !plugins.disabled.contains(name) {
            plugins.disabled.push(name.clone());
        }
    }

    plugins.validate()?;
    debug!("Resolved plugin configuration: {:?}", plugins);
    Ok(plugins)
}

/// Wire the registry to the plugins directory, the built-in factory,
/// the configured store and a session carrying the exclusions
pub fn build_registry(plugins: &PluginsConfig) -> Result<PluginRegistry> {
    let store: Arc<dyn PluginStore> = match &plugins.store {
        Some(path) => {
            info!("Using plugin store: {}", path.display());
            Arc::new(
                JsonFilePluginStore::open(path)
                    .with_context(|| format!("Failed to open plugin store: {}", path.display()))?,
            )
        }
        None => {
            debug!("No plugin store configured, using in-memory records");
            Arc::new(MemoryPluginStore::new())
        }
    };

    let session = Arc::new(SessionContext::with_excluded(&plugins.disabled));

    Ok(PluginRegistry::new(
        Box::new(FileBasedDiscovery::new(&plugins.directory)),
        Box::new(builtin::builtin_factory()),
        store,
        session,
    ))
}
