//! Search response wire types
//!
//! Decoding is lenient: every section defaults when absent so a partial or
//! unexpected body still yields whatever hits it carries.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Search response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub hits: Hits,
    /// Error payload, present when the backend rejected the request
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    /// A number, or `{ "value": n, "relation": "eq" }` on newer backends
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default, deserialize_with = "each_hit")]
    pub hits: Vec<Hit>,
}

/// One matched log record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source", default, deserialize_with = "object_or_empty")]
    pub source: Map<String, Value>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub highlight: Map<String, Value>,
}

/// Anything but a JSON object reads as an empty map
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Decode hits one at a time so a malformed entry becomes an empty hit
fn each_hit<'de, D>(deserializer: D) -> Result<Vec<Hit>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry).unwrap_or_else(|e| {
                tracing::debug!("Malformed hit decoded as empty: {}", e);
                Hit::default()
            })
        })
        .collect())
}

/// One root cause from an error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub error_type: String,
    pub reason: String,
}

impl QueryResponse {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits.hits
    }

    /// Total matches reported by the backend, if it reported one
    pub fn total_hits(&self) -> Option<u64> {
        match self.hits.total.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::Object(obj) => obj.get("value").and_then(Value::as_u64),
            _ => None,
        }
    }

    /// Root causes from the error payload, in order
    pub fn backend_errors(&self) -> Vec<BackendError> {
        let Some(error) = &self.error else {
            return Vec::new();
        };

        let text = |v: &Value, key: &str| {
            v.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match error {
            Value::Object(obj) => match obj.get("root_cause").and_then(Value::as_array) {
                Some(causes) if !causes.is_empty() => causes
                    .iter()
                    .map(|cause| BackendError {
                        error_type: text(cause, "type"),
                        reason: text(cause, "reason"),
                    })
                    .collect(),
                // No root causes, report the error itself
                _ => vec![BackendError {
                    error_type: text(error, "type"),
                    reason: text(error, "reason"),
                }],
            },
            // Some proxies answer with a bare message
            Value::String(reason) => vec![BackendError {
                error_type: "error".to_string(),
                reason: reason.clone(),
            }],
            _ => Vec::new(),
        }
    }
}

impl Hit {
    /// The single highlight fragment for a field.
    ///
    /// Returns `None` unless the backend produced exactly one string fragment.
    pub fn fragment(&self, field: &str) -> Option<&str> {
        match self.highlight.get(field)? {
            Value::Array(fragments) if fragments.len() == 1 => fragments[0].as_str(),
            _ => None,
        }
    }
}
