//! Admissions Assistant
//!
//! A search-backed conversational assistant for university admissions
//! questions. Each submission runs a Gemini reasoning loop that may call a
//! Tavily web search before answering in a small HTML subset.
//!
//! # Quick Start
//!
//! ```no_run
//! use admissions_assistant::prelude::*;
//!
//! # async fn example() -> admissions_assistant::error::Result<()> {
//! let config = AssistantConfig::load(None)?;
//! let orchestrator = TurnOrchestrator::from_config(&config);
//! let mut session = Session::new();
//! let answer = orchestrator.submit(&mut session, "When is the CAT exam this year?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod markup;
pub mod models;
pub mod prelude;
pub mod prompt;
pub mod provider;
pub mod search;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
