use std::{io::Write, sync::Arc};

use clap::{CommandFactory, Parser, error::ErrorKind};
use retry_cli::{
    AttemptError, LogWriter, Orchestrator, RetryError, SignalRelay, Subscribe, TerminalStatus,
};

mod cli;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if cli.command.first().is_none_or(|program| program.is_empty()) {
        let shown = Cli::command()
            .print_help()
            .and_then(|()| std::io::stdout().flush());
        if let Err(e) = shown {
            eprintln!("retry: {e}");
            std::process::exit(1);
        }
        std::process::exit(0);
    }

    let config = match cli.config().validated() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let mut subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();
    if cli.verbose {
        subscribers.push(Arc::new(LogWriter::new()));
    }

    let status = match run(&config, cli.command, subscribers).await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("retry: {e}");
            TerminalStatus::ExitCode(1)
        }
    };
    status.terminate()
}

async fn run(
    config: &retry_cli::RetryConfig,
    argv: Vec<String>,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> Result<TerminalStatus, RetryError> {
    let relay = SignalRelay::install()?;
    let summary = Orchestrator::new(config, argv, relay, subscribers)?
        .run()
        .await?;

    if let Some(err @ AttemptError::Spawn { .. }) = &summary.last_failure {
        eprintln!("retry: {err}");
    }
    Ok(summary.status)
}
