mod common;

use std::time::Duration;

use tokio::sync::mpsc;

use aurora_terminal::config::{Narrative, Script};
use aurora_terminal::input::UserEvent;
use aurora_terminal::phase::{Phase, PhaseController, PhaseOutcome, RunExit, RunReport};
use aurora_terminal::render::{Class, Directive, RecordingRenderer, Target};

use common::{RunningTerminal, SEQUENCE_BUDGET, settle};

fn appended_chars(renderer: &RecordingRenderer) -> usize {
    renderer.count(|d| matches!(d, Directive::AppendChar(..)))
}

fn shown(renderer: &RecordingRenderer, phase: Phase) -> usize {
    renderer.count(|d| *d == Directive::ShowPhase(phase))
}

// ============================================================================
// Full sequence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn full_sequence_reaches_hub_after_acknowledge() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Boot);

    tokio::time::sleep(SEQUENCE_BUDGET).await;
    assert!(!term.handle.is_finished(), "briefing must wait for input");

    term.send(UserEvent::Acknowledge).await;
    term.send(UserEvent::Quit).await;
    let (controller, report) = term.finish().await;

    assert_eq!(
        report,
        RunReport {
            final_phase: Phase::Hub,
            hub_entries: 1,
            skipped_intro: false,
            exit: RunExit::Quit,
        }
    );

    let narrative = Narrative::default();
    let r = controller.renderer();
    assert_eq!(r.text(Target::BootText), narrative.boot_sequence.join("\n"));
    assert_eq!(r.text(Target::BriefingText), narrative.briefing_text);
    assert_eq!(r.text(Target::StatusText), narrative.alert_text);
    assert!(r.has_class(Target::SystemStatus, Class::Critical));
    assert_eq!(r.visible_phase(), Some(Phase::Hub));
    assert!(!r.is_visible(Target::SkipButton));
    assert!(!r.is_visible(Target::ReadyButton));

    for phase in Phase::ALL {
        assert_eq!(shown(r, phase), 1, "{phase} shown once");
    }
}

#[tokio::test(start_paused = true)]
async fn phases_are_shown_in_order() {
    let term = RunningTerminal::spawn(
        Script::default().scaled(0.0),
        RecordingRenderer::new(),
        Phase::Boot,
    );
    tokio::time::sleep(SEQUENCE_BUDGET).await;
    term.send(UserEvent::Acknowledge).await;
    let (controller, _) = term.finish().await;

    let order: Vec<Phase> = controller
        .renderer()
        .directives()
        .iter()
        .filter_map(|d| match d {
            Directive::ShowPhase(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(order, Phase::ALL.to_vec());
}

#[tokio::test(start_paused = true)]
async fn briefing_never_auto_advances() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Briefing);

    // An acknowledgement typed while the briefing is still being revealed
    settle().await;
    term.send(UserEvent::Acknowledge).await;

    tokio::time::sleep(SEQUENCE_BUDGET * 10).await;
    let (controller, report) = term.finish().await;

    assert_eq!(report.final_phase, Phase::Briefing);
    assert_eq!(report.hub_entries, 0);
    assert_eq!(report.exit, RunExit::InputClosed);
    assert!(controller.renderer().is_visible(Target::ReadyButton));
}

// ============================================================================
// Skip
// ============================================================================

#[tokio::test(start_paused = true)]
async fn skip_from_any_timed_phase_reaches_hub() {
    for start in [Phase::Boot, Phase::SystemCheck, Phase::Crisis, Phase::Briefing] {
        let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), start);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(term.skip.request_skip(), "{start}: first skip triggers");
        settle().await;
        let (controller, report) = term.finish().await;

        assert_eq!(report.final_phase, Phase::Hub, "{start}");
        assert!(report.skipped_intro, "{start}");
        assert_eq!(report.hub_entries, 1, "{start}");
        assert_eq!(report.exit, RunExit::InputClosed, "{start}");
        assert!(!controller.is_interrupted(), "{start}: hub re-arms the signal");

        // Nothing after the interrupted phase ran
        if let Some(next) = start.next().filter(|p| *p != Phase::Hub) {
            assert_eq!(shown(controller.renderer(), next), 0, "{start}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn skip_mid_line_completes_the_line() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Boot);

    tokio::time::sleep(Duration::from_millis(200)).await;
    term.skip.request_skip();
    let (controller, _) = term.finish().await;

    let first_line = &Narrative::default().boot_sequence[0];
    let r = controller.renderer();
    assert_eq!(r.text(Target::BootText), first_line.as_str());
    assert!(appended_chars(r) < first_line.chars().count());
}

#[tokio::test(start_paused = true)]
async fn skip_mid_briefing_completes_the_briefing() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Briefing);

    tokio::time::sleep(Duration::from_secs(1)).await;
    term.skip.request_skip();
    let (controller, report) = term.finish().await;

    assert!(report.skipped_intro);
    assert_eq!(
        controller.renderer().text(Target::BriefingText),
        Narrative::default().briefing_text
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_skip_equals_one_skip() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Boot);

    settle().await;
    assert!(term.skip.request_skip());
    assert!(!term.skip.request_skip());
    let (_, report) = term.finish().await;

    assert_eq!(report.hub_entries, 1);
}

#[tokio::test(start_paused = true)]
async fn skip_in_hub_reenters_hub() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Hub);
    settle().await;

    // Each skip in the hub is processable again after the re-entry
    for _ in 0..2 {
        assert!(term.skip.request_skip());
        settle().await;
    }

    term.send(UserEvent::Quit).await;
    let (controller, report) = term.finish().await;

    assert_eq!(report.hub_entries, 3);
    assert!(!report.skipped_intro);
    assert_eq!(report.exit, RunExit::Quit);
    assert!(!controller.is_interrupted());
    assert_eq!(shown(controller.renderer(), Phase::Hub), 3);
}

#[tokio::test(start_paused = true)]
async fn starting_at_hub_runs_no_sequence() {
    let term = RunningTerminal::spawn(Script::default(), RecordingRenderer::new(), Phase::Hub);
    settle().await;
    let (controller, report) = term.finish().await;

    assert_eq!(report.hub_entries, 1);
    assert_eq!(appended_chars(controller.renderer()), 0);
}

// ============================================================================
// Rendering failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn missing_targets_never_block_the_hub() {
    let renderer = RecordingRenderer::without([
        Target::BootText,
        Target::SystemInterface,
        Target::SystemStatus,
        Target::StatusText,
        Target::ErrorMessages,
        Target::BriefingText,
        Target::ReadyButton,
        Target::SkipButton,
    ]);
    let term = RunningTerminal::spawn(Script::default().scaled(0.0), renderer, Phase::Boot);

    tokio::time::sleep(SEQUENCE_BUDGET).await;
    term.send(UserEvent::Acknowledge).await;
    let (controller, report) = term.finish().await;

    assert_eq!(report.final_phase, Phase::Hub);
    assert!(!report.skipped_intro);
    assert!(controller.renderer().skipped() > 0);
}

// ============================================================================
// Timing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn crisis_pulses_are_reproducible_with_seed() {
    let mut elapsed = Vec::new();
    for _ in 0..2 {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut controller =
            PhaseController::new(Script::default(), RecordingRenderer::new(), rx).with_seed(99);
        let started = tokio::time::Instant::now();
        assert_eq!(controller.run_crisis().await, PhaseOutcome::Completed);
        elapsed.push(started.elapsed());
    }
    // Timer resolution is one millisecond per wait
    assert!(elapsed[0].abs_diff(elapsed[1]) <= Duration::from_millis(10));
    // alarm + 8 pulses of 150..=350ms + hold
    assert!(elapsed[0] >= Duration::from_millis(2500 + 8 * 150 + 2000));
    assert!(elapsed[0] <= Duration::from_millis(2500 + 8 * 350 + 2000 + 10));
}

#[tokio::test(start_paused = true)]
async fn effects_run_until_skip() {
    let mut script = Script::default();
    script.effects.start_delay = Duration::ZERO;
    script.effects.scanline.interval = Duration::from_millis(200);
    script.effects.scanline.probability = 1.0;
    script.effects.screen.probability = 0.0;

    let (_tx, rx) = mpsc::unbounded_channel();
    let mut controller = PhaseController::new(script, RecordingRenderer::new(), rx);
    controller.spawn_effects();

    let dims = |c: &PhaseController<RecordingRenderer>| {
        c.renderer()
            .count(|d| *d == Directive::AddClass(Target::Scanlines, Class::Dimmed))
    };

    assert_eq!(controller.run_system_check().await, PhaseOutcome::Completed);
    let during = dims(&controller);
    assert!(during >= 10, "expected flickers during the dwell, got {during}");

    controller.request_skip();
    controller.enter_hub();
    let _ = tokio::time::timeout(Duration::from_secs(5), controller.run_hub()).await;

    // At most one flicker already in flight when the skip landed
    assert!(dims(&controller) <= during + 1);
}
