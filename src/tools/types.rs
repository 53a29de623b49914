//! Parameter schemas the model sees for each tool.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON Schema for a tool's arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentToolParameters {
    pub schema: Value,
}

impl AgentToolParameters {
    pub fn from_schema(schema: Value) -> Self {
        Self { schema }
    }

    /// Object schema of `(name, description)` string fields, all required.
    pub fn required_strings(fields: &[(&str, &str)]) -> Self {
        let properties: Map<String, Value> = fields
            .iter()
            .map(|(name, description)| {
                (
                    name.to_string(),
                    json!({ "type": "string", "description": description }),
                )
            })
            .collect();
        let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        Self::from_schema(json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }))
    }

    /// Required fields that `args` lacks or sets to null.
    pub fn missing_fields(&self, args: &Value) -> Vec<String> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter(|name| args.get(*name).map_or(true, Value::is_null))
            .map(str::to_string)
            .collect()
    }
}
