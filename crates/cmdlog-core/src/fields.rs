//! Field registry - the catalog of log record fields and their render state
//!
//! Fields are looked up by a lowercase key and printed in a fixed display
//! order that is independent of lookup order.

use crate::error::CoreError;
use std::collections::BTreeMap;

/// How the renderer formats a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Array valued, only the first element is printed
    Tags,
    /// Severity, padded and colored
    LogLevel,
    /// Printed raw or highlighted
    Plain,
}

/// A single log record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogField {
    /// Lowercase identifier used by enable/disable
    pub key: String,
    /// Field name in the indexed document
    pub display_name: String,
    /// Whether the renderer prints this field
    pub enabled: bool,
}

impl LogField {
    pub fn new(key: &str, display_name: &str, enabled: bool) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            enabled,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self.key.as_str() {
            "tags" => FieldKind::Tags,
            "loglevel" => FieldKind::LogLevel,
            _ => FieldKind::Plain,
        }
    }
}

/// Catalog seeded at startup: (key, document field name, enabled)
const CATALOG: &[(&str, &str, bool)] = &[
    ("tags", "tags", true),
    ("sourceobject", "SourceObject", true),
    ("thread", "Thread", false),
    ("loglevel", "LogLevel", true),
    ("timestamp", "TimeStamp", true),
    ("logid", "LogId", false),
    ("process", "Process", false),
    ("host", "Host", false),
    ("text", "text", true),
    ("file", "File", false),
    ("routine", "Routine", false),
    ("line", "Line", false),
    ("data", "Data", false),
];

/// Column order used when rendering hits
const DISPLAY_ORDER: &[&str] = &[
    "tags",
    "logid",
    "timestamp",
    "loglevel",
    "host",
    "process",
    "thread",
    "sourceobject",
    "routine",
    "file",
    "line",
    "text",
    "data",
];

/// Registry of known fields plus the order they are displayed in
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: BTreeMap<String, LogField>,
    order: Vec<String>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::with_default_catalog()
    }
}

impl FieldRegistry {
    /// Build a registry from fields and a display order.
    ///
    /// Order entries that do not name a registered field, and repeated
    /// entries, are dropped so every displayed column resolves.
    pub fn new(fields: Vec<LogField>, order: &[&str]) -> Self {
        let fields: BTreeMap<String, LogField> =
            fields.into_iter().map(|f| (f.key.clone(), f)).collect();

        let mut seen = Vec::with_capacity(order.len());
        for key in order {
            if !fields.contains_key(*key) {
                tracing::warn!("Display order references unknown field: {}", key);
                continue;
            }
            if seen.iter().any(|k: &String| k == key) {
                continue;
            }
            seen.push(key.to_string());
        }

        Self {
            fields,
            order: seen,
        }
    }

    /// The ALMA log catalog with its default column order
    pub fn with_default_catalog() -> Self {
        let fields = CATALOG
            .iter()
            .map(|(key, name, enabled)| LogField::new(key, name, *enabled))
            .collect();
        Self::new(fields, DISPLAY_ORDER)
    }

    /// Look up a field, case-folding the key
    pub fn get(&self, key: &str) -> Option<&LogField> {
        self.fields.get(&key.to_lowercase())
    }

    /// Enable or disable a field by key (case-insensitive)
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<(), CoreError> {
        let key = key.to_lowercase();
        match self.fields.get_mut(&key) {
            Some(field) => {
                field.enabled = enabled;
                Ok(())
            }
            None => Err(CoreError::InvalidField(key)),
        }
    }

    /// Fields in lookup (alphabetical key) order
    pub fn iter(&self) -> impl Iterator<Item = &LogField> {
        self.fields.values()
    }

    /// Fields in display order
    pub fn display_order(&self) -> impl Iterator<Item = &LogField> {
        self.order.iter().filter_map(|key| self.fields.get(key))
    }

    /// Enabled fields in display order
    pub fn enabled(&self) -> impl Iterator<Item = &LogField> {
        self.display_order().filter(|f| f.enabled)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
