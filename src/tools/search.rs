//! Web search exposed to the model as a tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::AssistantError;
use crate::search::{truncate_utf8, SearchProvider, SearchResponse};

/// Name the model uses to call the search tool.
pub const SEARCH_TOOL_NAME: &str = "tavily_search_results_json";

const DESCRIPTION: &str = "A search engine optimized for comprehensive, accurate, and trusted results. \
Useful for when you need to answer questions about current events, admissions deadlines, \
eligibility requirements, fee structures and entrance exam dates. Input should be a search query.";

/// Notice attached to an empty result set so the model points at the official source.
pub const NO_RESULTS_NOTICE: &str = "The search returned no results. Do not guess dates or \
requirements; tell the user to check the official website of the institution.";

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Adapter from a [`SearchProvider`] to the [`Tool`] contract.
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    parameters: AgentToolParameters,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            parameters: AgentToolParameters::required_strings(&[("query", "search query to look up")]),
        }
    }

    fn render(&self, response: SearchResponse) -> Value {
        let limit = self.provider.options().raw_content_limit;
        let results: Vec<Value> = response
            .results
            .into_iter()
            .map(|r| {
                let mut entry = json!({
                    "title": r.title,
                    "url": r.url,
                    "content": r.snippet,
                });
                if let Some(raw) = r.raw_content {
                    entry["raw_content"] = Value::String(truncate_utf8(&raw, limit));
                }
                if let Some(date) = r.published_date {
                    entry["published_date"] = Value::String(date);
                }
                entry
            })
            .collect();

        let mut out = json!({
            "query": response.query,
            "results": results,
        });
        if let Some(answer) = response.answer {
            out["answer"] = Value::String(answer);
        }
        if results_are_empty(&out) {
            out["notice"] = Value::String(NO_RESULTS_NOTICE.to_string());
        }
        out
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<Value, AssistantError> {
        let SearchArgs { query } = args.deserialize()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(AssistantError::InvalidArgument("Search query must not be empty".into()));
        }

        let response = self.provider.search(query).await?;
        info!(
            provider = self.provider.provider_name(),
            thread_id = ctx.thread_id.as_deref().unwrap_or("-"),
            query,
            results = response.results.len(),
            "web search"
        );
        Ok(self.render(response))
    }
}

/// Whether a rendered search tool result carries no hits.
pub fn results_are_empty(result: &Value) -> bool {
    result
        .get("results")
        .and_then(Value::as_array)
        .map_or(true, |r| r.is_empty())
}
