//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    build_registry,
    configure_logging,
    create_colour_manager,
    load_configuration,
    resolve_plugins_config,
};
pub use execution::run_action;
