//! Interactive terminal front end.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::Parser;

use crate::agent::{Session, TurnOrchestrator, TurnRole};
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::markup::render_terminal;
use crate::models::GoogleModel;

/// University admissions assistant
#[derive(Parser, Debug)]
#[command(
    name = "admissions-assistant",
    version,
    about = "Search-backed assistant for university admissions questions"
)]
pub struct Cli {
    /// Secrets file holding GOOGLE_API_KEY and TAVILY_API_KEY
    #[arg(long)]
    pub secrets: Option<PathBuf>,

    /// Gemini model (e.g. gemini-2.5-flash or google:gemini-2.5-pro)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Search results fetched per query
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Model calls allowed per question
    #[arg(long)]
    pub max_steps: Option<usize>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AssistantConfig) -> Result<(), AssistantError> {
        if let Some(model) = &self.model {
            config.model = GoogleModel::parse(model)?;
        }
        if let Some(n) = self.max_results {
            if n == 0 {
                return Err(AssistantError::Configuration(
                    "--max-results must be at least 1".into(),
                ));
            }
            config.search.max_results = n;
        }
        if let Some(n) = self.max_steps {
            config.max_steps = n.max(1);
        }
        Ok(())
    }
}

/// Intro text shown before the first prompt.
pub fn banner(today: NaiveDate) -> String {
    let year = today.year();
    format!(
        "🎓 University Admissions Assistant\n\
         Ask about application deadlines, eligibility, fees and entrance exams\n\
         for the {year}-{next} admissions cycle. Answers are backed by live web search.\n\
         Commands: /history reprints the conversation, /quit exits.\n",
        next = year + 1
    )
}

enum Command {
    Quit,
    History,
    Ask(String),
    Empty,
}

fn parse_line(line: &str) -> Command {
    match line.trim() {
        "" => Command::Empty,
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        other => Command::Ask(other.to_string()),
    }
}

fn print_history<W: Write>(session: &Session, out: &mut W) -> std::io::Result<()> {
    if session.conversation().is_empty() {
        return writeln!(out, "(no messages yet)");
    }
    for turn in session.conversation().all() {
        match turn.role {
            TurnRole::User => writeln!(out, "\nyou> {}", turn.content)?,
            TurnRole::Assistant => writeln!(out, "\n{}", render_terminal(&turn.content))?,
        }
    }
    Ok(())
}

/// Read questions from `input` until EOF or `/quit`, answering each in `session`.
///
/// Failed submissions are reported on `out` and the loop carries on.
pub async fn run_repl<R: BufRead, W: Write>(
    orchestrator: &TurnOrchestrator,
    session: &mut Session,
    mut input: R,
    out: &mut W,
) -> Result<(), AssistantError> {
    writeln!(out, "{}", banner(orchestrator.today()))?;
    loop {
        write!(out, "you> ")?;
        out.flush()?;

        let mut raw = Vec::new();
        match input.read_until(b'\n', &mut raw) {
            Ok(0) => {
                writeln!(out)?;
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                writeln!(out)?;
                return Ok(());
            }
        }
        // Undecodable bytes are replaced rather than ending the session.
        let line = String::from_utf8_lossy(&raw);

        match parse_line(&line) {
            Command::Empty => continue,
            Command::Quit => return Ok(()),
            Command::History => print_history(session, out)?,
            Command::Ask(question) => match orchestrator.submit(session, &question).await {
                Ok(answer) => writeln!(out, "\n{}\n", render_terminal(&answer))?,
                Err(e) => {
                    tracing::error!(error = %e, category = ?e.category(), "Submission failed");
                    writeln!(out, "\n{}\n", e.user_message())?;
                }
            },
        }
    }
}
