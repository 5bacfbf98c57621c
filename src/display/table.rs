//! Table formatting for plugin listings and load reports

use prettytable::{format, Cell, Row, Table};

use crate::display::ColourManager;
use crate::plugin::{LoadReport, PluginInfo, PluginRecord};

/// Format a compact table with headers and rows using prettytable-rs clean format
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    table.add_row(Row::new(headers.iter().map(|header| Cell::new(header)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
    }

    let mut result = String::new();
    for line in table.to_string().lines() {
        result.push_str("  ");
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

/// One row per plugin of a load pass.
///
/// The coloured status goes last so escape codes do not skew column widths.
pub fn plugin_status_rows(report: &LoadReport, colours: &ColourManager) -> Vec<Vec<String>> {
    report
        .outcomes
        .iter()
        .map(|(name, outcome)| {
            let version = outcome
                .handle()
                .map(|plugin| plugin.info().version.clone())
                .unwrap_or_else(|| "-".to_string());
            vec![
                name.to_string(),
                version,
                outcome.detail().unwrap_or_default().to_string(),
                colours.status(outcome.label()).to_string(),
            ]
        })
        .collect()
}

/// Key/value rows describing a single plugin
pub fn plugin_detail_rows(info: &PluginInfo, record: Option<&PluginRecord>) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["Name".to_string(), info.name.to_string()],
        vec!["Version".to_string(), info.version.clone()],
        vec!["API version".to_string(), info.api_version.to_string()],
        vec!["Author".to_string(), info.author.clone()],
        vec!["Description".to_string(), info.description.clone()],
        vec!["Events".to_string(), info.events.join(", ")],
    ];

    match record {
        Some(record) => {
            rows.push(vec!["Enabled".to_string(), yes_no(record.enabled)]);
            rows.push(vec!["Available".to_string(), yes_no(record.available)]);
        }
        None => rows.push(vec!["Enabled".to_string(), "no record".to_string()]),
    }

    rows
}

/// One-line totals for a load pass
pub fn format_load_summary(report: &LoadReport, disabled: usize) -> String {
    format!(
        "{} discovered | {} loaded | {} disabled | {} failed",
        report.len(),
        report.loaded_count(),
        disabled,
        report.failures().len()
    )
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
