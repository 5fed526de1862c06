//! Decoding of structured reasoning-engine replies.
//!
//! Engines do not always honor the requested schema, so a reply is sorted
//! into one of three shapes before anything reads it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use scout_core::types::OutputSchema;

/// Reply shape requested from the URL selection step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSelection {
    pub selected_urls: Vec<String>,
}

impl UrlSelection {
    pub fn schema() -> OutputSchema {
        OutputSchema {
            name: "url_selection".into(),
            description: "Reddit post URLs relevant to the user's question.".into(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "selected_urls": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "List of selected Reddit post URLs relevant to the user's query."
                    }
                },
                "required": ["selected_urls"]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply<T> {
    /// The reply matched the schema.
    Schema(T),
    /// A JSON object that did not match the schema.
    Mapping(Map<String, Value>),
    /// Anything else: a bare string, array, number or null.
    Unrecognized(Value),
}

impl<T: serde::de::DeserializeOwned> StructuredReply<T> {
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                match serde_json::from_value::<T>(Value::Object(map.clone())) {
                    Ok(typed) => Self::Schema(typed),
                    Err(_) => Self::Mapping(map),
                }
            }
            other => Self::Unrecognized(other),
        }
    }
}

impl StructuredReply<UrlSelection> {
    /// The selected URLs, whatever shape the reply took.
    ///
    /// A loose mapping contributes the string entries of its `selected_urls`
    /// key. Every other shape yields an empty list.
    pub fn into_urls(self) -> Vec<String> {
        match self {
            Self::Schema(selection) => selection.selected_urls,
            Self::Mapping(map) => match map.get("selected_urls") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                Some(Value::String(single)) => vec![single.clone()],
                _ => {
                    warn!(keys = ?map.keys().collect::<Vec<_>>(), "Structured reply has no selected_urls");
                    Vec::new()
                }
            },
            Self::Unrecognized(value) => {
                warn!(reply = %value, "Unexpected response format from reasoning engine");
                Vec::new()
            }
        }
    }
}
