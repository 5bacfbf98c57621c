//! Built-in Plugin Implementations
//!
//! Plugins shipped with the application. Each still has to be present in the
//! plugins directory and enabled in the store before it is loaded.

pub mod authenticator;
pub mod audit;

pub use authenticator::AuthenticatorPlugin;
pub use audit::AuditPlugin;

use super::error::PluginResult;
use super::factory::ConstructorTable;
use super::traits::Plugin;

/// Names of all built-in plugins
pub fn get_builtin_plugins() -> Vec<&'static str> {
    vec![authenticator::PLUGIN_NAME, audit::PLUGIN_NAME]
}

fn create_authenticator() -> PluginResult<Box<dyn Plugin>> {
    Ok(Box::new(AuthenticatorPlugin::new()))
}

fn create_audit() -> PluginResult<Box<dyn Plugin>> {
    Ok(Box::new(AuditPlugin::new()))
}

/// Factory pre-populated with every built-in plugin
pub fn builtin_factory() -> ConstructorTable {
    ConstructorTable::new()
        .with(authenticator::PLUGIN_NAME, create_authenticator)
        .with(audit::PLUGIN_NAME, create_audit)
}
