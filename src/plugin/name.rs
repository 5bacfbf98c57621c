//! Canonical plugin names

use std::borrow::Borrow;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Canonical plugin identifier.
///
/// The first character is upper-cased and the remainder is kept as given, so
/// `ldap`, `Ldap` and `ldap` all refer to the plugin living in `Ldap/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PluginName(String);

impl PluginName {
    /// Canonicalize a raw name
    pub fn new<S: AsRef<str>>(raw: S) -> Self {
        let raw = raw.as_ref().trim();
        let mut chars = raw.chars();
        let canonical = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File stem that marks a plugin directory, e.g. `LdapPlugin`
    pub fn implementation_stem(&self) -> String {
        format!("{}Plugin", self.0)
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PluginName {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<PluginName> for String {
    fn from(name: PluginName) -> Self {
        name.0
    }
}

impl AsRef<str> for PluginName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PluginName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PluginName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PluginName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
