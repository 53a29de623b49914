//! Tool-use reasoning loop.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AssistantError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::search::{results_are_empty, SEARCH_TOOL_NAME};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::*;

/// Default cap on model calls per turn.
pub const DEFAULT_MAX_STEPS: usize = 8;

/// One model call and the tool work it triggered.
#[derive(Debug, Clone)]
pub struct ReasoningStep {
    pub content: ResponseContent,
    pub tool_calls: Vec<AgentToolCall>,
    pub tool_results: Vec<AgentToolResult>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Result of one reasoning run.
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    /// Content of the last model reply.
    pub content: ResponseContent,
    pub steps: Vec<ReasoningStep>,
    /// Transcript up to, not including, the final answer.
    pub messages: Vec<ModelMessage>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ReasoningOutcome {
    /// Final answer text extracted from the last reply.
    pub fn final_text(&self) -> String {
        self.content.extract_text()
    }

    /// True when the model searched at least once and no search produced results.
    pub fn searched_without_results(&self) -> bool {
        let mut searches = self
            .steps
            .iter()
            .flat_map(|s| s.tool_results.iter())
            .filter(|r| r.name == SEARCH_TOOL_NAME)
            .peekable();
        if searches.peek().is_none() {
            return false;
        }
        searches.all(|r| r.is_error || results_are_empty(&r.result))
    }
}

/// Drives the model until it answers in text or the step budget runs out.
pub struct ReasoningLoop {
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
    settings: GenerationSettings,
    max_steps: usize,
}

impl ReasoningLoop {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
            settings: GenerationSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(
            self.tools
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters().schema.clone(),
                })
                .collect(),
        )
    }

    /// Run the loop over `history` (which must end with the new user message).
    ///
    /// Tool calls are executed one at a time, in the order the model issued
    /// them. A failure reaching the search provider aborts the run; bad tool
    /// arguments and unknown tools are reported back to the model instead.
    pub async fn run(
        &self,
        system: &str,
        mut messages: Vec<ModelMessage>,
        thread_id: &str,
    ) -> Result<ReasoningOutcome, AssistantError> {
        let tool_defs = self.tool_definitions();
        let mut steps = Vec::new();
        let mut total_usage = Usage::default();

        for step_index in 0..self.max_steps {
            let mut request_messages = Vec::with_capacity(messages.len() + 1);
            request_messages.push(ModelMessage::system(system));
            request_messages.extend(messages.iter().cloned());

            let request = ProviderRequest {
                messages: request_messages,
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };

            debug!(step = step_index, thread_id, "reasoning: calling provider");
            let response = self.provider.generate_text(&request).await?;
            total_usage.merge(&response.usage);

            let mut step = ReasoningStep {
                content: response.content.clone(),
                tool_calls: response.tool_calls.clone(),
                tool_results: Vec::new(),
                usage: response.usage,
                finish_reason: response.finish_reason,
            };

            if response.tool_calls.is_empty() {
                steps.push(step);
                return Ok(ReasoningOutcome {
                    content: response.content,
                    steps,
                    messages,
                    usage: total_usage,
                    finish_reason: response.finish_reason,
                });
            }

            messages.push(ModelMessage::assistant_tool_calls(
                &response.content.extract_text(),
                &response.tool_calls,
            ));

            let ctx = ToolExecutionContext {
                thread_id: Some(thread_id.to_string()),
                step: step_index,
            };
            for tc in &response.tool_calls {
                let result = self.execute_tool(tc, &ctx).await?;
                step.tool_results.push(result.clone());
                messages.push(ModelMessage::tool_result(result));
            }

            steps.push(step);
        }

        warn!(max_steps = self.max_steps, thread_id, "reasoning: step budget exhausted");
        let content = steps
            .iter()
            .rev()
            .map(|s| &s.content)
            .find(|c| !c.is_empty())
            .cloned()
            .unwrap_or_default();
        Ok(ReasoningOutcome {
            content,
            steps,
            messages,
            usage: total_usage,
            finish_reason: Some(FinishReason::Length),
        })
    }

    async fn execute_tool(
        &self,
        tc: &AgentToolCall,
        ctx: &ToolExecutionContext,
    ) -> Result<AgentToolResult, AssistantError> {
        let Some(tool) = self.tools.iter().find(|t| t.name() == tc.name) else {
            warn!(tool = tc.name, "Tool not found");
            return Ok(AgentToolResult {
                tool_call_id: tc.id.clone(),
                name: tc.name.clone(),
                result: serde_json::json!({"error": format!("Tool '{}' not found", tc.name)}),
                is_error: true,
            });
        };

        let args = ToolArguments::new(tc.arguments.clone());
        let missing = tool.parameters().missing_fields(args.raw());
        if !missing.is_empty() {
            warn!(tool = tc.name, ?missing, "Tool call missing required arguments");
            return Ok(AgentToolResult {
                tool_call_id: tc.id.clone(),
                name: tc.name.clone(),
                result: serde_json::json!({
                    "error": format!("Missing required argument(s): {}", missing.join(", "))
                }),
                is_error: true,
            });
        }
        match tool.execute(&args, ctx).await {
            Ok(val) => Ok(AgentToolResult {
                tool_call_id: tc.id.clone(),
                name: tc.name.clone(),
                result: val,
                is_error: false,
            }),
            Err(e) if e.is_external() => Err(e),
            Err(e) => {
                warn!(tool = tc.name, error = %e, "Tool execution failed");
                Ok(AgentToolResult {
                    tool_call_id: tc.id.clone(),
                    name: tc.name.clone(),
                    result: serde_json::json!({"error": e.to_string()}),
                    is_error: true,
                })
            }
        }
    }
}
