//! Generation settings and response content shapes.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Settings controlling text generation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
}

/// Content of a model reply: either plain text or a list of content segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseContent {
    Text(String),
    Segments(Vec<serde_json::Value>),
}

impl Default for ResponseContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl ResponseContent {
    /// Extract the final answer text.
    ///
    /// Plain text is returned as-is. For a segment list the first segment's
    /// `text` field wins; otherwise the whole list is rendered as JSON.
    /// An empty list yields an empty string.
    pub fn extract_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Segments(segments) => {
                let Some(first) = segments.first() else {
                    return String::new();
                };
                match first.get("text").and_then(|t| t.as_str()) {
                    Some(text) => text.to_string(),
                    None => serde_json::Value::Array(segments.clone()).to_string(),
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Segments(segments) => segments.is_empty(),
        }
    }
}
