//! Google Gemini model definitions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AssistantError;

/// Google Gemini models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GoogleModel {
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Custom/unknown Google model.
    #[strum(default)]
    Custom(String),
}

impl Default for GoogleModel {
    fn default() -> Self {
        Self::Gemini25Flash
    }
}

impl GoogleModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Custom(s) => s,
        }
    }

    /// Parse `gemini-2.5-flash` or `google:gemini-2.5-flash`.
    pub fn parse(selector: &str) -> Result<Self, AssistantError> {
        let id = selector
            .strip_prefix("google:")
            .unwrap_or(selector)
            .trim();
        if id.is_empty() {
            return Err(AssistantError::InvalidArgument(format!(
                "Invalid model selector '{selector}': expected a Gemini model id"
            )));
        }
        Ok(Self::from_str(id).unwrap_or_else(|_| Self::Custom(id.to_string())))
    }
}
