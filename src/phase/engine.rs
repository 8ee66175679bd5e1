//! Phase controller orchestration.
//!
//! The `PhaseController` owns the current phase, the skip signal, the
//! rendering stage and the hub session. Timed phases run one after the
//! other on a single task; the skip signal is the only thing another task
//! can touch.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Script;
use crate::effects;
use crate::hub::{HubSession, Navigator, SystemNavigator};
use crate::input::UserEvent;
use crate::render::{Class, Cue, Directive, Renderer, Target};

use super::interrupt::{InterruptSignal, SkipTrigger};
use super::stage::{Stage, Waited};
use super::state::{Phase, PhaseOutcome, RunExit, RunReport};
use super::typing::TypingTask;

/// Returns early from a phase runner unless the step completed.
macro_rules! settle {
    ($outcome:expr) => {
        match $outcome {
            PhaseOutcome::Completed => {}
            other => return other,
        }
    };
}

/// Drives the scripted sequence and the hub.
pub struct PhaseController<R> {
    script: Arc<Script>,
    stage: Stage<R>,
    phase: Phase,
    interrupt: InterruptSignal,
    hub: HubSession,
    rng: StdRng,
    hub_entries: u32,
    effect_tasks: Vec<JoinHandle<()>>,
}

impl<R: Renderer> PhaseController<R> {
    /// Creates a controller in the `Boot` phase with an armed skip signal.
    pub fn new(script: Script, renderer: R, events: mpsc::UnboundedReceiver<UserEvent>) -> Self {
        let hub = HubSession::new(
            Arc::new(script.missions.clone()),
            script.timing.vault_duration,
            Box::new(SystemNavigator::default()),
        );
        Self {
            script: Arc::new(script),
            stage: Stage::new(renderer, events),
            phase: Phase::Boot,
            interrupt: InterruptSignal::new(),
            hub,
            rng: StdRng::from_os_rng(),
            hub_entries: 0,
            effect_tasks: Vec::new(),
        }
    }

    /// Replaces the redirect side effect used by the hub.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.hub.set_navigator(navigator);
        self
    }

    /// Seeds the pulse interval generator for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` if a skip is pending.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_triggered()
    }

    /// Returns a handle input sources use to request a skip.
    pub fn skip_trigger(&self) -> SkipTrigger {
        self.interrupt.skip_trigger()
    }

    /// Returns the renderer.
    pub const fn renderer(&self) -> &R {
        self.stage.renderer()
    }

    /// Returns the hub session.
    pub const fn hub_session(&self) -> &HubSession {
        &self.hub
    }

    /// Returns the loaded script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Requests a skip to the hub.
    ///
    /// Idempotent: returns `true` only for the call that triggered the
    /// signal. The in-flight step finishes, then the sequence unwinds.
    pub fn request_skip(&self) -> bool {
        let triggered = self.interrupt.trigger();
        if triggered {
            info!(phase = %self.phase, "skip requested");
        }
        triggered
    }

    /// Starts the atmospheric effect tasks.
    ///
    /// They observe the current skip token and stop for good once it is
    /// cancelled; re-entering the hub does not restart them.
    pub fn spawn_effects(&mut self) {
        if !self.effect_tasks.is_empty() {
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.stage.attach_effects(rx);
        self.effect_tasks = effects::spawn(&self.script.effects, &tx, &self.interrupt.token());
    }

    /// Runs the sequence from `start`, then the hub until the user quits or
    /// input closes.
    pub async fn run(&mut self, start: Phase) -> RunReport {
        info!(%start, "sequence starting");
        let outcome = self.run_sequence(start).await;

        if outcome == PhaseOutcome::InputClosed {
            return self.report(false, RunExit::InputClosed);
        }

        let skipped_intro = outcome == PhaseOutcome::Interrupted;
        if skipped_intro {
            info!(from = %self.phase, "sequence interrupted; jumping to hub");
        }

        self.enter_hub();
        let exit = self.run_hub().await;
        self.report(skipped_intro, exit)
    }

    /// Runs the timed phases from `start` up to (not including) the hub.
    ///
    /// Returns `Completed` once the briefing is acknowledged, or the first
    /// non-completed outcome.
    pub async fn run_sequence(&mut self, start: Phase) -> PhaseOutcome {
        let mut phase = start;
        loop {
            let outcome = match phase {
                Phase::Boot => self.run_boot().await,
                Phase::SystemCheck => self.run_system_check().await,
                Phase::Crisis => self.run_crisis().await,
                Phase::Briefing => self.run_briefing().await,
                Phase::Hub => return PhaseOutcome::Completed,
            };
            settle!(outcome);
            match phase.next() {
                Some(next) => phase = next,
                None => return PhaseOutcome::Completed,
            }
        }
    }

    /// Boot: types each narrative line, pausing between lines.
    pub async fn run_boot(&mut self) -> PhaseOutcome {
        let token = self.interrupt.token();
        if token.is_cancelled() {
            return PhaseOutcome::Interrupted;
        }
        self.transition(Phase::Boot);

        let script = Arc::clone(&self.script);
        let timing = &script.timing;
        self.stage.emit(Directive::ClearText(Target::BootText));

        for line in &script.narrative.boot_sequence {
            self.stage.emit(Directive::NewLine(Target::BootText));
            settle!(
                TypingTask::new(Target::BootText, line, timing.typewriter_speed)
                    .run(&mut self.stage, &token)
                    .await
            );
            settle!(self.stage.pause(timing.boot_line_delay, &token).await);
        }

        self.stage.pause(timing.boot_hold, &token).await
    }

    /// System check: a fixed dwell on the system interface.
    pub async fn run_system_check(&mut self) -> PhaseOutcome {
        let token = self.interrupt.token();
        if token.is_cancelled() {
            return PhaseOutcome::Interrupted;
        }
        self.transition(Phase::SystemCheck);

        let dwell = self.script.timing.system_dwell;
        self.stage.pause(dwell, &token).await
    }

    /// Crisis: alarm, then randomized glitch pulses.
    pub async fn run_crisis(&mut self) -> PhaseOutcome {
        let token = self.interrupt.token();
        if token.is_cancelled() {
            return PhaseOutcome::Interrupted;
        }
        self.transition(Phase::Crisis);

        let script = Arc::clone(&self.script);
        let timing = &script.timing;

        self.stage
            .emit(Directive::AddClass(Target::SystemStatus, Class::Critical));
        self.stage.emit(Directive::SetText(
            Target::StatusText,
            script.narrative.alert_text.clone(),
        ));
        self.stage.emit(Directive::Cue(Cue::Alarm));
        self.stage
            .emit(Directive::AddClass(Target::SystemInterface, Class::GlitchActive));
        self.stage.emit(Directive::show(Target::ErrorMessages));

        settle!(self.stage.pause(timing.alarm_duration, &token).await);

        for pulse in 0..timing.glitch_pulses {
            let wait = random_between(&mut self.rng, timing.glitch_min, timing.glitch_max);
            debug!(pulse, wait_ms = wait.as_millis(), "glitch pulse");
            settle!(self.stage.pause(wait, &token).await);
            self.stage.emit(Directive::ToggleClass(
                Target::SystemInterface,
                Class::GlitchActive,
            ));
        }

        self.stage.pause(timing.crisis_hold, &token).await
    }

    /// Briefing: types the narrative, then waits for an explicit
    /// acknowledgement. Never advances on its own.
    pub async fn run_briefing(&mut self) -> PhaseOutcome {
        let token = self.interrupt.token();
        if token.is_cancelled() {
            return PhaseOutcome::Interrupted;
        }
        self.transition(Phase::Briefing);

        let script = Arc::clone(&self.script);
        self.stage.emit(Directive::ClearText(Target::BriefingText));
        settle!(
            TypingTask::new(
                Target::BriefingText,
                &script.narrative.briefing_text,
                script.timing.briefing_speed,
            )
            .run(&mut self.stage, &token)
            .await
        );

        let stale = self.stage.discard_pending_events();
        if stale > 0 {
            debug!(stale, "discarded input received before the briefing finished");
        }
        self.stage.emit(Directive::show(Target::ReadyButton));

        loop {
            match self.stage.wait_event(&token).await {
                Waited::Interrupted => return PhaseOutcome::Interrupted,
                Waited::Closed => return PhaseOutcome::InputClosed,
                Waited::Event(UserEvent::Acknowledge) => {
                    info!("briefing acknowledged");
                    self.stage.emit(Directive::Cue(Cue::Ui));
                    self.stage.emit(Directive::hide(Target::ReadyButton));
                    return PhaseOutcome::Completed;
                }
                Waited::Event(event) => debug!(?event, "ignored during briefing"),
            }
        }
    }

    /// Enters the hub: re-arms the skip signal and starts a new session.
    ///
    /// Safe to call repeatedly; every call resets the signal. Input queued
    /// during the sequence is dropped on the way in, input queued while
    /// already in the hub is kept.
    pub fn enter_hub(&mut self) {
        if self.interrupt.reset() {
            debug!("skip signal re-armed");
        }
        let from_sequence = self.phase != Phase::Hub;
        self.hub_entries += 1;
        self.transition(Phase::Hub);
        self.stage.emit(Directive::hide(Target::ReadyButton));
        if from_sequence {
            self.stage.discard_pending_events();
        }
        self.hub.restart(&mut self.stage);
    }

    /// Handles hub input until the user quits or input closes.
    ///
    /// A skip while in the hub re-enters it.
    pub async fn run_hub(&mut self) -> RunExit {
        loop {
            let token = self.interrupt.token();
            match self.stage.wait_event(&token).await {
                Waited::Interrupted => {
                    info!("skip requested in hub; re-entering");
                    self.enter_hub();
                }
                Waited::Closed => return RunExit::InputClosed,
                Waited::Event(UserEvent::Quit) => {
                    info!(session = %self.hub.id(), "quit requested");
                    return RunExit::Quit;
                }
                Waited::Event(UserEvent::Skip) => {
                    self.request_skip();
                }
                Waited::Event(event) => self.hub.handle(event, &mut self.stage, &token).await,
            }
        }
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        info!(%from, %to, "phase transition");
        self.stage.emit(Directive::ShowPhase(to));
        self.stage.emit(if to.is_skippable() {
            Directive::show(Target::SkipButton)
        } else {
            Directive::hide(Target::SkipButton)
        });
    }

    const fn report(&self, skipped_intro: bool, exit: RunExit) -> RunReport {
        RunReport {
            final_phase: self.phase,
            hub_entries: self.hub_entries,
            skipped_intro,
            exit,
        }
    }
}

impl<R> Drop for PhaseController<R> {
    fn drop(&mut self) {
        for task in &self.effect_tasks {
            task.abort();
        }
    }
}

impl<R> std::fmt::Debug for PhaseController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseController")
            .field("phase", &self.phase)
            .field("interrupt", &self.interrupt.state())
            .field("hub_entries", &self.hub_entries)
            .finish_non_exhaustive()
    }
}

/// Draws a duration uniformly from `[min, max]` (bounds in either order).
fn random_between(rng: &mut StdRng, min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let lo = u64::try_from(lo.as_micros()).unwrap_or(u64::MAX);
    let hi = u64::try_from(hi.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(rng.random_range(lo..=hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Narrative, Timing};
    use crate::render::RecordingRenderer;

    fn script() -> Script {
        Script {
            narrative: Narrative {
                boot_sequence: vec!["> UNO".to_string(), "> DOS".to_string()],
                briefing_text: "CADETE, LISTO?".to_string(),
                ..Narrative::default()
            },
            ..Script::default()
        }
    }

    fn controller() -> (
        PhaseController<RecordingRenderer>,
        mpsc::UnboundedSender<UserEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let c = PhaseController::new(script(), RecordingRenderer::new(), rx).with_seed(7);
        (c, tx)
    }

    #[test]
    fn new_controller_is_armed_in_boot() {
        let (c, _tx) = controller();
        assert_eq!(c.phase(), Phase::Boot);
        assert!(!c.is_interrupted());
    }

    #[tokio::test(start_paused = true)]
    async fn boot_types_every_line() {
        let (mut c, _tx) = controller();
        let outcome = c.run_boot().await;
        assert_eq!(outcome, PhaseOutcome::Completed);
        assert_eq!(c.renderer().text(Target::BootText), "> UNO\n> DOS");
        assert_eq!(c.renderer().visible_phase(), Some(Phase::Boot));
        assert!(c.renderer().is_visible(Target::SkipButton));
    }

    #[tokio::test(start_paused = true)]
    async fn system_check_dwells() {
        let (mut c, _tx) = controller();
        let started = tokio::time::Instant::now();
        assert_eq!(c.run_system_check().await, PhaseOutcome::Completed);
        assert!(started.elapsed() >= Timing::default().system_dwell);
        assert_eq!(c.phase(), Phase::SystemCheck);
    }

    #[tokio::test(start_paused = true)]
    async fn crisis_alarms_and_pulses() {
        let (mut c, _tx) = controller();
        assert_eq!(c.run_crisis().await, PhaseOutcome::Completed);
        let r = c.renderer();
        assert!(r.has_class(Target::SystemStatus, Class::Critical));
        assert_eq!(r.text(Target::StatusText), "¡ALERTA! ¡SEÑAL CRÍTICA!");
        assert_eq!(r.cues(), vec![Cue::Alarm]);
        assert!(r.is_visible(Target::ErrorMessages));
        let toggles = r.count(|d| matches!(d, Directive::ToggleClass(..)));
        assert_eq!(toggles, 8);
        // Even number of toggles leaves the glitch where the alarm put it
        assert!(r.has_class(Target::SystemInterface, Class::GlitchActive));
    }

    #[tokio::test(start_paused = true)]
    async fn briefing_waits_for_acknowledgement() {
        let (mut c, tx) = controller();
        let handle = tokio::spawn(async move {
            let outcome = c.run_briefing().await;
            (c, outcome)
        });

        // Far longer than the typing takes; still no acknowledgement
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(!handle.is_finished());

        tx.send(UserEvent::Acknowledge).unwrap();
        let (c, outcome) = handle.await.unwrap();
        assert_eq!(outcome, PhaseOutcome::Completed);
        assert_eq!(c.renderer().text(Target::BriefingText), "CADETE, LISTO?");
    }

    #[tokio::test(start_paused = true)]
    async fn early_acknowledgement_is_discarded() {
        let (mut c, tx) = controller();
        tx.send(UserEvent::Acknowledge).unwrap();
        drop(tx);
        // The early event is dropped; the closed channel then ends the wait
        assert_eq!(c.run_briefing().await, PhaseOutcome::InputClosed);
    }

    #[tokio::test]
    async fn runners_refuse_to_start_when_interrupted() {
        let (mut c, _tx) = controller();
        c.request_skip();
        assert_eq!(c.run_boot().await, PhaseOutcome::Interrupted);
        assert_eq!(c.run_system_check().await, PhaseOutcome::Interrupted);
        assert_eq!(c.run_crisis().await, PhaseOutcome::Interrupted);
        assert_eq!(c.run_briefing().await, PhaseOutcome::Interrupted);
        // Nothing was rendered
        assert!(c.renderer().directives().is_empty());
    }

    #[test]
    fn request_skip_is_idempotent() {
        let (c, _tx) = controller();
        assert!(c.request_skip());
        assert!(!c.request_skip());
        assert!(c.is_interrupted());
    }

    #[test]
    fn enter_hub_rearms_and_hides_skip() {
        let (mut c, _tx) = controller();
        c.request_skip();
        c.enter_hub();
        assert_eq!(c.phase(), Phase::Hub);
        assert!(!c.is_interrupted());
        assert!(!c.renderer().is_visible(Target::SkipButton));
        // A later skip is processable again
        assert!(c.request_skip());
    }

    #[tokio::test]
    async fn hub_reentry_on_skip_then_quit() {
        let (mut c, tx) = controller();
        c.enter_hub();
        let first_session = c.hub_session().id();

        tx.send(UserEvent::Skip).unwrap();
        tx.send(UserEvent::Quit).unwrap();

        // The quit typed right after the skip survives the re-entry
        assert_eq!(c.run_hub().await, RunExit::Quit);
        assert_ne!(c.hub_session().id(), first_session);
        assert!(!c.is_interrupted());
        assert_eq!(c.report(false, RunExit::Quit).hub_entries, 2);
    }

    #[tokio::test]
    async fn entering_hub_from_sequence_drops_typed_ahead_input() {
        let (mut c, tx) = controller();
        tx.send(UserEvent::Quit).unwrap();
        c.enter_hub();
        drop(tx);
        assert_eq!(c.run_hub().await, RunExit::InputClosed);
    }

    #[test]
    fn random_between_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let d = random_between(
                &mut rng,
                Duration::from_millis(150),
                Duration::from_millis(350),
            );
            assert!(d >= Duration::from_millis(150) && d <= Duration::from_millis(350));
        }
        let d = random_between(&mut rng, Duration::from_millis(5), Duration::from_millis(5));
        assert_eq!(d, Duration::from_millis(5));
        let d = random_between(&mut rng, Duration::from_millis(9), Duration::from_millis(3));
        assert!(d >= Duration::from_millis(3) && d <= Duration::from_millis(9));
    }
}
