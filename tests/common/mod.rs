//! Shared test helpers: a scripted model provider and a canned search provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use admissions_assistant::agent::{ReasoningLoop, TurnOrchestrator};
use admissions_assistant::error::AssistantError;
use admissions_assistant::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use admissions_assistant::search::{SearchOptions, SearchProvider, SearchResponse, SearchResult};
use admissions_assistant::tools::search::SEARCH_TOOL_NAME;
use admissions_assistant::tools::{
    AgentToolParameters, Tool, ToolArguments, ToolExecutionContext, WebSearchTool,
};
use admissions_assistant::types::*;

/// A mock provider that replays queued responses and records every request.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<VecDeque<Result<ProviderResponse, AssistantError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn usage(output_tokens: u32) -> Usage {
        Usage {
            input_tokens: 10,
            output_tokens,
            total_tokens: 10 + output_tokens,
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        let mut response = ProviderResponse::text(text);
        response.usage = Self::usage(20);
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a response whose content is a list of segments.
    pub fn queue_segments(&self, segments: Vec<serde_json::Value>) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            content: ResponseContent::Segments(segments),
            usage: Self::usage(20),
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        let mut response = ProviderResponse::tool_calls(vec![AgentToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: args,
        }]);
        response.usage = Self::usage(5);
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue one response carrying several tool calls at once.
    pub fn queue_tool_calls(&self, calls: Vec<AgentToolCall>) {
        let mut response = ProviderResponse::tool_calls(calls);
        response.usage = Self::usage(5);
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a search call for `query`.
    pub fn queue_search(&self, id: &str, query: &str) {
        self.queue_tool_call(id, SEARCH_TOOL_NAME, serde_json::json!({ "query": query }));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: AssistantError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, AssistantError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderResponse::text("<p>Mock response</p>")))
    }
}

/// Search provider returning a fixed response (or error) for every query.
pub struct FixedSearch {
    options: SearchOptions,
    outcome: Result<Vec<SearchResult>, String>,
    queries: Mutex<Vec<String>>,
}

impl FixedSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            options: SearchOptions::default(),
            outcome: Ok(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_results(vec![])
    }

    /// Every search fails as if the service were unreachable.
    pub fn failing(message: &str) -> Self {
        Self {
            options: SearchOptions::default(),
            outcome: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FixedSearch {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, AssistantError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.outcome {
            Ok(results) => Ok(SearchResponse {
                query: query.to_string(),
                answer: None,
                results: results.clone(),
            }),
            Err(message) => Err(AssistantError::external("fixed", message.clone())),
        }
    }
}

/// Exam-calendar tool that always fails with a tool execution error.
pub struct FailingTool {
    parameters: AgentToolParameters,
}

impl FailingTool {
    pub const NAME: &'static str = "lookup_exam";

    pub fn new() -> Self {
        Self {
            parameters: AgentToolParameters::required_strings(&[("exam", "exam name")]),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Look up an exam calendar"
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AssistantError> {
        let exam = args.raw()["exam"].as_str().unwrap_or_default().to_string();
        Err(AssistantError::ToolExecution {
            tool_name: Self::NAME.into(),
            message: format!("no calendar for {exam}"),
        })
    }
}

pub fn search_call(id: &str, query: &str) -> AgentToolCall {
    AgentToolCall {
        id: id.to_string(),
        name: SEARCH_TOOL_NAME.to_string(),
        arguments: serde_json::json!({ "query": query }),
    }
}

pub fn result(title: &str, url: &str, snippet: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
        raw_content: None,
        score: Some(0.9),
        published_date: None,
    }
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Orchestrator over a mock model and a fixed search provider, pinned to [`fixed_today`].
pub fn orchestrator(provider: Arc<MockProvider>, search: Arc<FixedSearch>) -> TurnOrchestrator {
    let reasoning = ReasoningLoop::new(provider).with_tool(Arc::new(WebSearchTool::new(search)));
    TurnOrchestrator::new(reasoning).with_clock(fixed_today)
}
