//! Display module for colour management and table output
//!
//! Colours follow `--no-color` and the `NO_COLOR` environment variable.

pub mod colours;
pub mod table;

pub use colours::ColourManager;
pub use table::{format_compact_table, plugin_detail_rows, plugin_status_rows, format_load_summary};
