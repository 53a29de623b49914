//! Convenience re-exports for common use.

pub use crate::agent::{Conversation, Session, Turn, TurnOrchestrator, TurnRole};
pub use crate::config::AssistantConfig;
pub use crate::error::{AssistantError, Result};
pub use crate::models::GoogleModel;
pub use crate::provider::ModelProvider;
pub use crate::search::{SearchOptions, SearchProvider};
pub use crate::tools::{Tool, WebSearchTool};
pub use crate::types::{FinishReason, GenerationSettings, ModelMessage, Role, Usage};
