//! Google Gemini API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::AssistantError;
use crate::models::GoogleModel;
use crate::types::*;
use crate::util::retry::RetryPolicy;

use super::http::{shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the provider at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let mut system_instruction = None;
        let mut contents = Vec::new();
        // Results answering one model turn travel together in a single content.
        let mut responses: Vec<Value> = Vec::new();

        for msg in &request.messages {
            if msg.role != Role::Tool && !responses.is_empty() {
                contents.push(function_responses(std::mem::take(&mut responses)));
            }
            match msg.role {
                Role::System => {
                    system_instruction = Some(json!({
                        "parts": [{"text": msg.text()}]
                    }));
                }
                Role::User => {
                    contents.push(json!({
                        "role": "user",
                        "parts": [{"text": msg.text()}],
                    }));
                }
                Role::Assistant => {
                    let parts = build_model_parts(&msg.content);
                    if !parts.is_empty() {
                        contents.push(json!({
                            "role": "model",
                            "parts": parts,
                        }));
                    }
                }
                Role::Tool => {
                    responses.extend(msg.content.iter().filter_map(|part| match part {
                        ContentPart::ToolResult(tr) => Some(function_response_part(tr)),
                        _ => None,
                    }));
                }
            }
        }
        if !responses.is_empty() {
            contents.push(function_responses(responses));
        }

        let mut body = Map::new();
        body.insert("contents".into(), Value::Array(contents));

        if let Some(sys) = system_instruction {
            body.insert("systemInstruction".into(), sys);
        }

        let mut gen_config = Map::new();
        if let Some(max) = request.settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            gen_config.insert("stopSequences".into(), json!(stops));
        }
        if !gen_config.is_empty() {
            body.insert("generationConfig".into(), Value::Object(gen_config));
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let fn_decls: Vec<Value> = tools
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        })
                    })
                    .collect();
                body.insert(
                    "tools".into(),
                    json!([{"functionDeclarations": fn_decls}]),
                );
            }
        }

        Value::Object(body)
    }

    async fn send_once(&self, url: &str, body: &Value) -> Result<GeminiResponse, AssistantError> {
        let resp = shared_client()
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| AssistantError::MalformedResponse(format!("Gemini response: {e}")))
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, AssistantError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        debug!(model = self.model.as_str(), messages = request.messages.len(), "Google generate_text");

        let data = self.retry.execute(|| self.send_once(&url, &body)).await?;

        let candidate = data.candidates.into_iter().next().ok_or_else(|| {
            AssistantError::MalformedResponse("No candidates in Gemini response".into())
        })?;

        let mut segments = Vec::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(fc) = part.function_call {
                tool_calls.push(AgentToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: fc.name,
                    arguments: fc.args.unwrap_or_else(|| Value::Object(Map::new())),
                });
                continue;
            }
            if part.thought.unwrap_or(false) {
                continue;
            }
            match part.text {
                Some(text) => segments.push(json!({"type": "text", "text": text})),
                None if !part.other.is_empty() => segments.push(Value::Object(part.other)),
                None => {}
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else {
            match candidate.finish_reason.as_deref() {
                Some("STOP") => Some(FinishReason::Stop),
                Some("MAX_TOKENS") => Some(FinishReason::Length),
                Some("SAFETY") | Some("RECITATION") => Some(FinishReason::ContentFilter),
                Some(_) => Some(FinishReason::Error),
                None => None,
            }
        };

        let usage = data
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            content: collapse_segments(segments),
            usage,
            tool_calls,
            finish_reason,
        })
    }
}

/// A lone text segment is reported as plain text; anything richer stays a list.
fn collapse_segments(mut segments: Vec<Value>) -> ResponseContent {
    match segments.len() {
        0 => ResponseContent::Text(String::new()),
        1 if segments[0].get("text").and_then(Value::as_str).is_some() => {
            let text = segments
                .pop()
                .and_then(|s| s.get("text").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_default();
            ResponseContent::Text(text)
        }
        _ => ResponseContent::Segments(segments),
    }
}

fn function_response_part(result: &AgentToolResult) -> Value {
    let response = match &result.result {
        Value::Object(_) => result.result.clone(),
        other => json!({ "content": other }),
    };
    json!({
        "functionResponse": {
            "name": result.name,
            "response": response,
        }
    })
}

fn function_responses(parts: Vec<Value>) -> Value {
    json!({
        "role": "user",
        "parts": parts,
    })
}

fn build_model_parts(content: &[ContentPart]) -> Vec<Value> {
    content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if !text.is_empty() => Some(json!({"text": text})),
            ContentPart::ToolCall(tc) => Some(json!({
                "functionCall": {
                    "name": tc.name,
                    "args": tc.arguments,
                }
            })),
            _ => None,
        })
        .collect()
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
    function_call: Option<GeminiFunctionCall>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
