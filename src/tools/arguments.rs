//! Arguments of one tool call.

use serde_json::{Map, Value};

use crate::error::AssistantError;

/// Arguments the model supplied for a tool call, normalised to a JSON value.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    /// Some models send arguments as a JSON-encoded string; those are decoded here.
    /// A blank string becomes an empty object. Undecodable strings are kept as-is.
    pub fn new(value: Value) -> Self {
        let value = match value {
            Value::String(raw) if raw.trim().is_empty() => Value::Object(Map::new()),
            Value::String(raw) => {
                serde_json::from_str(raw.trim()).unwrap_or(Value::String(raw))
            }
            other => other,
        };
        Self { value }
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Deserialize into the tool's argument struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AssistantError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            AssistantError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
