//! Admissions assistant binary entry point.

use admissions_assistant::agent::{Session, TurnOrchestrator};
use admissions_assistant::cli::{run_repl, Cli};
use admissions_assistant::config::AssistantConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admissions_assistant=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    let mut config = match AssistantConfig::load(cli.secrets.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };
    if let Err(e) = cli.apply(&mut config) {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    let orchestrator = TurnOrchestrator::from_config(&config);
    let mut session = Session::new();
    info!(
        model = orchestrator.reasoning().provider().model_id(),
        max_results = config.search.max_results,
        session = %session.id(),
        "Session started"
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    if let Err(e) = run_repl(&orchestrator, &mut session, stdin.lock(), &mut stdout).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
