//! `aurora` - A.U.R.O.R.A. mission control terminal

use clap::Parser;

use aurora_terminal::cli::args::Cli;
use aurora_terminal::cli::commands;
use aurora_terminal::error::ExitCode;
use aurora_terminal::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // The sequence holds no state worth flushing; a signal ends the process
    tokio::spawn(async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
                        _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to register SIGTERM handler"),
            }
        }

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(ExitCode::INTERRUPTED);
        }
    });

    let result = commands::dispatch(cli).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
