//! Session variables consulted by the query builder
//!
//! Values are opaque strings. Type coercion happens where they are used.

use std::collections::BTreeMap;

pub const FROM: &str = "from";
pub const SIZE: &str = "size";
pub const GTE: &str = "gte";
pub const LTE: &str = "lte";
pub const RESTRICTED: &str = "restricted";

pub const DEFAULT_FROM: &str = "0";
pub const DEFAULT_SIZE: &str = "50";

/// String-keyed session variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionVariables {
    values: BTreeMap<String, String>,
}

impl Default for SessionVariables {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert(FROM.to_string(), DEFAULT_FROM.to_string());
        values.insert(SIZE.to_string(), DEFAULT_SIZE.to_string());
        values.insert(GTE.to_string(), "now-1d".to_string());
        values.insert(LTE.to_string(), "now".to_string());
        values.insert(RESTRICTED.to_string(), "0".to_string());
        Self { values }
    }
}

impl SessionVariables {
    /// An empty variable set with none of the recognized keys seeded
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Overwrite or create an entry. No validation.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Whether queries are limited to the `gte`..`lte` time window
    pub fn is_restricted(&self) -> bool {
        self.get(RESTRICTED) == Some("1")
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_defaults() {
        let vars = SessionVariables::default();
        assert_eq!(vars.get(FROM), Some("0"));
        assert_eq!(vars.get(SIZE), Some("50"));
        assert!(!vars.is_restricted());
    }

    #[test]
    fn set_overwrites_and_creates() {
        let mut vars = SessionVariables::default();
        vars.set("size", "10");
        vars.set("custom", "anything");
        assert_eq!(vars.get("size"), Some("10"));
        assert_eq!(vars.get("custom"), Some("anything"));
    }

    #[test]
    fn restricted_is_exact_string_match() {
        let mut vars = SessionVariables::default();
        vars.set(RESTRICTED, "true");
        assert!(!vars.is_restricted());
        vars.set(RESTRICTED, "1");
        assert!(vars.is_restricted());
    }

    #[test]
    fn iter_is_sorted_by_key() {
        let vars = SessionVariables::default();
        let keys: Vec<&str> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["from", "gte", "lte", "restricted", "size"]);
    }
}
