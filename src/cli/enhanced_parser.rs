//! Parsing for CLI arguments that accept both repeated flags and comma-separated values

/// Parse a vector of strings that may contain comma-separated values
///
/// Items are split on commas, trimmed, and empty items are dropped.
///
/// # Examples
///
/// ```
/// use vault_plugins::cli::enhanced_parser::parse_comma_separated;
///
/// // Multiple flags: --disable Ldap --disable Totp
/// let input = vec!["Ldap".to_string(), "Totp".to_string()];
/// assert_eq!(parse_comma_separated(input), vec!["Ldap", "Totp"]);
///
/// // Mixed: --disable "Ldap,Totp" --disable Audit
/// let input = vec!["Ldap,Totp".to_string(), "Audit".to_string()];
/// assert_eq!(parse_comma_separated(input), vec!["Ldap", "Totp", "Audit"]);
/// ```
pub fn parse_comma_separated(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .flat_map(|item| {
            item.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<String>>()
        })
        .collect()
}

pub struct EnhancedParser;

impl EnhancedParser {
    /// Parse plugin name lists, dropping duplicates while keeping first-seen order
    pub fn parse_plugin_names(names: Vec<String>) -> Vec<String> {
        let mut seen = Vec::new();
        for name in parse_comma_separated(names) {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}
