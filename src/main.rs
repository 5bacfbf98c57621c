use anyhow::Result;
use log::{debug, error};
use std::process;

use vault_plugins::{app, cli, logging};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {:?}", panic_info);
        eprintln!("Panic: {:?}", panic_info);
        process::exit(101);
    }));

    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let plugins = app::resolve_plugins_config(&args, &config_manager)?;
    let colours = app::create_colour_manager(&args);

    let action = args.action();
    debug!("Running action {:?}", action);

    app::run_action(&action, &plugins, &colours)
}
