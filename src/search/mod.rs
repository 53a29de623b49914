//! Web search: provider trait, query options and result records.

pub mod tavily;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AssistantError;

pub use tavily::TavilyClient;

/// How much effort the provider spends extracting content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

/// Earliest publication date accepted from the search provider.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}

/// Per-call search options, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchOptions {
    pub max_results: usize,
    pub depth: SearchDepth,
    /// Recency cutoff; `None` disables it.
    pub start_date: Option<NaiveDate>,
    pub include_raw_content: bool,
    pub include_answer: bool,
    /// Raw page content is cut to this many bytes before reaching the model.
    pub raw_content_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 3,
            depth: SearchDepth::Advanced,
            start_date: Some(default_start_date()),
            include_raw_content: true,
            include_answer: true,
            raw_content_limit: 4000,
        }
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Results for one query, in provider rank order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResponse {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// An external query → ranked-results service.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name (e.g. "tavily").
    fn provider_name(&self) -> &str;

    /// Options every query is issued with.
    fn options(&self) -> &SearchOptions;

    /// Run one query. Unreachable or malformed providers yield
    /// [`AssistantError::ExternalService`].
    async fn search(&self, query: &str) -> Result<SearchResponse, AssistantError>;
}

/// Cut `s` to at most `max_bytes` without splitting a code point.
pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
