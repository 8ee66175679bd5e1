//! Shared integration-test harness: spawning the controller on a task and
//! running the `aurora` binary as a child process.

#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use aurora_terminal::config::Script;
use aurora_terminal::hub::RecordingNavigator;
use aurora_terminal::input::UserEvent;
use aurora_terminal::phase::{Phase, PhaseController, RunReport, SkipTrigger};
use aurora_terminal::render::RecordingRenderer;

/// Longer than the whole default sequence takes to reach the briefing wait.
pub const SEQUENCE_BUDGET: Duration = Duration::from_secs(120);

/// A controller running on its own task.
pub struct RunningTerminal {
    pub handle: JoinHandle<(PhaseController<RecordingRenderer>, RunReport)>,
    pub events: mpsc::UnboundedSender<UserEvent>,
    pub skip: SkipTrigger,
    pub navigator: RecordingNavigator,
}

impl RunningTerminal {
    /// Spawns `run(start)` over a recording renderer and navigator.
    pub fn spawn(script: Script, renderer: RecordingRenderer, start: Phase) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let navigator = RecordingNavigator::new();
        let mut controller = PhaseController::new(script, renderer, rx)
            .with_seed(11)
            .with_navigator(Box::new(navigator.clone()));
        let skip = controller.skip_trigger();

        let handle = tokio::spawn(async move {
            let report = controller.run(start).await;
            (controller, report)
        });

        Self {
            handle,
            events,
            skip,
            navigator,
        }
    }

    /// Sends an event, then lets the controller settle.
    pub async fn send(&self, event: UserEvent) {
        self.events.send(event).expect("controller dropped its receiver");
        settle().await;
    }

    /// Closes input and waits for the run to end.
    pub async fn finish(self) -> (PhaseController<RecordingRenderer>, RunReport) {
        drop(self.events);
        self.handle.await.expect("controller task panicked")
    }
}

/// Lets every runnable task reach its next wait (paused clock).
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Runs the `aurora` binary with `args`, feeding `stdin`.
pub fn aurora(args: &[&str], stdin: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_aurora");
    let mut child = Command::new(bin)
        .args(args)
        .env_remove("AURORA_CONFIG")
        .env_remove("AURORA_SPEED")
        .env_remove("AURORA_COLOR")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn aurora");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for aurora")
}

/// Writes `content` to a temporary YAML file.
pub fn script_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("failed to write script");
    file
}
