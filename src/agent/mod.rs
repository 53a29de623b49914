//! Agent system: sessions, the reasoning loop and turn orchestration.

pub mod conversation;
pub mod orchestrator;
pub mod reasoning;
pub mod session;

pub use conversation::{Conversation, Turn, TurnRole};
pub use orchestrator::TurnOrchestrator;
pub use reasoning::{ReasoningLoop, ReasoningOutcome};
pub use session::{CheckpointStore, Session, SessionId};
