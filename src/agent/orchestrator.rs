//! Turn orchestration: one user submission in, one committed answer out.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, info_span, Instrument};

use super::conversation::Turn;
use super::reasoning::ReasoningLoop;
use super::session::{CheckpointStore, Session};
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::markup::{mentions_official_source, sanitize_answer, OFFICIAL_SOURCE_DIRECTIVE};
use crate::prompt::SystemInstruction;
use crate::provider::GoogleProvider;
use crate::search::tavily::TavilyClient;
use crate::tools::WebSearchTool;
use crate::types::{GenerationSettings, ModelMessage};
use crate::util::retry::RetryPolicy;

/// Source of "today" for the system instruction.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Runs submissions against a reasoning loop and keeps per-session checkpoints.
pub struct TurnOrchestrator {
    reasoning: ReasoningLoop,
    checkpoints: CheckpointStore,
    clock: Clock,
}

impl TurnOrchestrator {
    pub fn new(reasoning: ReasoningLoop) -> Self {
        Self {
            reasoning,
            checkpoints: CheckpointStore::new(),
            clock: Arc::new(local_today),
        }
    }

    /// Wire up Gemini and Tavily from resolved configuration.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let mut provider = GoogleProvider::new(config.model.clone(), config.google_api_key.clone())
            .with_retry_policy(RetryPolicy::with_max_retries(config.max_retries));
        if let Some(url) = &config.google_base_url {
            provider = provider.with_base_url(url.clone());
        }

        let mut search = TavilyClient::new(config.tavily_api_key.clone(), config.search.clone());
        if let Some(url) = &config.tavily_base_url {
            search = search.with_base_url(url.clone());
        }

        let settings = GenerationSettings::builder()
            .temperature(config.temperature)
            .build();
        let reasoning = ReasoningLoop::new(Arc::new(provider))
            .with_tool(Arc::new(WebSearchTool::new(Arc::new(search))))
            .with_settings(settings)
            .with_max_steps(config.max_steps);
        Self::new(reasoning)
    }

    /// Replace the date source (tests pin this).
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn reasoning(&self) -> &ReasoningLoop {
        &self.reasoning
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Today's date as the orchestrator sees it.
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Answer one user submission within `session`.
    ///
    /// On success the user turn and the assistant turn are appended together
    /// and the answer markup is returned. On failure the conversation is left
    /// untouched and the error is returned for display.
    pub async fn submit(
        &self,
        session: &mut Session,
        user_text: &str,
    ) -> Result<String, AssistantError> {
        let question = user_text.trim();
        if question.is_empty() {
            return Err(AssistantError::InvalidArgument(
                "Please enter a question.".to_string(),
            ));
        }

        let thread_id = session.context_key();
        let instruction = SystemInstruction::for_date(self.today());
        let mut transcript = self
            .checkpoints
            .load(&thread_id)
            .unwrap_or_else(|| session.conversation().to_messages());
        transcript.push(ModelMessage::user(question));

        let span = info_span!("submit", thread_id = %thread_id, turn = session.conversation().len());
        let outcome = self
            .reasoning
            .run(&instruction.render(), transcript, &thread_id)
            .instrument(span)
            .await?;

        let raw = outcome.final_text();
        if raw.trim().is_empty() {
            return Err(AssistantError::MalformedResponse(
                "model returned no content".to_string(),
            ));
        }
        let mut answer = sanitize_answer(&raw);
        if answer.is_empty() {
            return Err(AssistantError::MalformedResponse(
                "answer was empty after markup cleanup".to_string(),
            ));
        }
        if outcome.searched_without_results() && !mentions_official_source(&answer) {
            answer.push('\n');
            answer.push_str(OFFICIAL_SOURCE_DIRECTIVE);
        }

        let mut messages = outcome.messages;
        messages.push(ModelMessage::assistant(answer.clone()));
        self.checkpoints.save(&thread_id, messages);
        session.commit(Turn::user(question), Turn::assistant(answer.clone()));

        info!(
            thread_id = %thread_id,
            steps = outcome.steps.len(),
            input_tokens = outcome.usage.input_tokens,
            output_tokens = outcome.usage.output_tokens,
            "Turn committed"
        );
        Ok(answer)
    }
}
