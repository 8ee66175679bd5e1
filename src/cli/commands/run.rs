//! `run`: the interactive mission terminal.

use std::io::IsTerminal;

use tokio::sync::mpsc;

use crate::cli::args::{ColorChoice, RunArgs};
use crate::cli::commands::load_script;
use crate::error::AuroraError;
use crate::hub::SystemNavigator;
use crate::input;
use crate::observability::color_enabled;
use crate::phase::{PhaseController, RunExit};
use crate::render::TerminalRenderer;

/// Run the sequence and hub on stdin/stdout until the user quits or stdin
/// closes.
///
/// # Errors
///
/// Returns a usage error for a negative or non-finite `--speed`, a phase
/// error for an unknown `--start-at`, or a config error if the script
/// cannot be loaded.
pub async fn run(args: &RunArgs, color: ColorChoice) -> Result<(), AuroraError> {
    if !args.speed.is_finite() || args.speed < 0.0 {
        return Err(AuroraError::Usage(format!(
            "--speed must be a non-negative number, got {}",
            args.speed
        )));
    }

    let start = args.start_phase()?;

    let mut script = load_script(args.config.as_deref())?.scaled(args.speed);
    if args.no_effects {
        script.effects.enabled = false;
    }
    let levels = script.missions.level_ids();

    let stdout = std::io::stdout();
    let color = color_enabled(color, stdout.is_terminal());
    colored::control::set_override(color);
    let renderer = TerminalRenderer::new(stdout, color, args.bell);

    let (tx, rx) = mpsc::unbounded_channel();
    let mut controller = PhaseController::new(script, renderer, rx)
        .with_navigator(Box::new(SystemNavigator::new(args.open_browser)));
    if let Some(seed) = args.seed {
        controller = controller.with_seed(seed);
    }

    controller.spawn_effects();
    let reader = input::spawn_reader(tokio::io::stdin(), tx, controller.skip_trigger(), levels);

    tracing::info!(%start, speed = args.speed, "terminal starting");
    let report = controller.run(start).await;
    reader.abort();

    tracing::info!(
        final_phase = %report.final_phase,
        hub_entries = report.hub_entries,
        skipped_intro = report.skipped_intro,
        "terminal session ended"
    );
    if report.exit == RunExit::InputClosed {
        tracing::debug!("input closed");
    }

    Ok(())
}
