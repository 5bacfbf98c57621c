use clap::{ArgAction, Parser};
use anyhow::Result;
use std::path::PathBuf;
use log::debug;

use super::enhanced_parser::EnhancedParser;

/// Password Vault Plugin Loader
#[derive(Parser, Debug)]
#[command(name = "vault-plugins")]
#[command(about = "Discover, load and administer password vault plugins")]
#[command(version)]
pub struct Args {
    /// Directory containing one subdirectory per plugin
    #[arg(short = 'p', long = "plugins-dir", value_name = "DIR")]
    pub plugins_dir: Option<PathBuf>,

    /// JSON file holding plugin records (in-memory store when omitted)
    #[arg(short = 's', long = "store", value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Exclude plugins for this run - supports comma-separated values
    #[arg(short = 'd', long = "disable", value_name = "NAME", action = ArgAction::Append)]
    pub disable: Vec<String>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    // ============ ACTIONS ============

    /// List discovered plugins with their stored state
    #[arg(long = "list-plugins", group = "action")]
    pub list_plugins: bool,

    /// Load every discovered plugin and report the outcome (default)
    #[arg(long = "load", group = "action")]
    pub load: bool,

    /// Show details of a single plugin without loading it
    #[arg(long = "plugin-info", value_name = "NAME", group = "action")]
    pub plugin_info: Option<String>,

    /// Load plugins, then mark enabled plugins that failed to load as unavailable
    #[arg(long = "reconcile", group = "action")]
    pub reconcile: bool,

    /// Enable a plugin in the store
    #[arg(long = "enable-plugin", value_name = "NAME", group = "action")]
    pub enable_plugin: Option<String>,

    /// Disable a plugin in the store
    #[arg(long = "disable-plugin", value_name = "NAME", group = "action")]
    pub disable_plugin: Option<String>,
}

/// Operation selected on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Load,
    Info(String),
    Reconcile,
    Enable(String),
    Disable(String),
}

impl Args {
    /// Apply comma-separated parsing to list fields
    pub fn apply_enhanced_parsing(mut self) -> Self {
        self.disable = EnhancedParser::parse_plugin_names(self.disable);
        self
    }

    /// The requested action; loading when none is given
    pub fn action(&self) -> Action {
        if self.list_plugins {
            Action::List
        } else if let Some(name) = &self.plugin_info {
            Action::Info(name.clone())
        } else if self.reconcile {
            Action::Reconcile
        } else if let Some(name) = &self.enable_plugin {
            Action::Enable(name.clone())
        } else if let Some(name) = &self.disable_plugin {
            Action::Disable(name.clone())
        } else {
            Action::Load
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse().apply_enhanced_parsing();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {}
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Valid options: text, json",
                args.log_format
            ))
        }
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace",
                    level
                ))
            }
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file to be specified"));
    }

    for name in [&args.plugin_info, &args.enable_plugin, &args.disable_plugin]
        .into_iter()
        .flatten()
        .chain(args.disable.iter())
    {
        if name.trim().is_empty() || name.contains('.') || name.contains('/') {
            return Err(anyhow::anyhow!("Invalid plugin name '{}'", name));
        }
    }

    debug!("CLI arguments validated successfully");
    Ok(())
}
