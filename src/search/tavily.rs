//! Tavily search API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AssistantError;
use crate::provider::http::{bearer_headers, shared_client};

use super::{SearchDepth, SearchOptions, SearchProvider, SearchResponse, SearchResult};

const BASE_URL: &str = "https://api.tavily.com";
const SERVICE: &str = "tavily";

pub struct TavilyClient {
    api_key: String,
    base_url: String,
    options: SearchOptions,
}

impl TavilyClient {
    pub fn new(api_key: String, options: SearchOptions) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            options,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request<'a>(&self, query: &'a str) -> TavilyRequest<'a> {
        TavilyRequest {
            query,
            max_results: self.options.max_results,
            search_depth: self.options.depth,
            start_date: self.options.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            include_raw_content: self.options.include_raw_content,
            include_answer: self.options.include_answer,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn provider_name(&self) -> &str {
        SERVICE
    }

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, AssistantError> {
        let url = format!("{}/search", self.base_url);
        debug!(query, max_results = self.options.max_results, "Tavily search");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&self.build_request(query))
            .send()
            .await
            .map_err(|e| AssistantError::external(SERVICE, format!("request failed: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| AssistantError::external(SERVICE, format!("failed to read body: {e}")))?;

        if !(200..300).contains(&status) {
            return Err(AssistantError::external(
                SERVICE,
                format!("status {status}: {body}"),
            ));
        }

        let data: TavilyResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::external(SERVICE, format!("malformed response: {e}")))?;

        let results = data
            .results
            .into_iter()
            .take(self.options.max_results)
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                snippet: r.content,
                raw_content: r.raw_content.filter(|c| !c.trim().is_empty()),
                score: r.score,
                published_date: r.published_date,
            })
            .collect::<Vec<_>>();

        debug!(query, results = results.len(), "Tavily search complete");

        Ok(SearchResponse {
            query: data.query.unwrap_or_else(|| query.to_string()),
            answer: data.answer.filter(|a| !a.trim().is_empty()),
            results,
        })
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: SearchDepth,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    include_raw_content: bool,
    include_answer: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    query: Option<String>,
    answer: Option<String>,
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    raw_content: Option<String>,
    score: Option<f64>,
    published_date: Option<String>,
}
