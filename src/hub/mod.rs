//! Mission hub (post-sequence selection flow)
//!
//! Once the controller enters the hub, every further step is driven by the
//! user: choosing a protocol, entering the protocol 2 access code, picking
//! a level, and being redirected to the mission.
//!
//! # Architecture
//!
//! - [`HubSession`] - Per-entry selection state machine
//! - [`MissionCatalog`] - `(protocol, level)` to URL mapping
//! - [`Navigator`] - Redirect side effect

pub mod catalog;
pub mod navigator;

pub use catalog::{LevelUrls, MissionCatalog, Protocol};
pub use navigator::{Navigator, RecordingNavigator, SystemNavigator};

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AccessCodeError;
use crate::gate::{self, FORMAT_HINT};
use crate::input::{self, UserEvent};
use crate::phase::{PhaseOutcome, Stage};
use crate::render::{Cue, Directive, Renderer, Target};

/// Message shown for an empty access code submission.
pub const EMPTY_CODE_MESSAGE: &str = "INGRESE UN CÓDIGO DE ACCESO.";

/// Where the hub selection flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    /// Protocol menu, nothing open
    Idle,
    /// Access code prompt open for protocol 2
    AwaitingCode,
    /// Vault animation playing
    Vault,
    /// Level modal open for a protocol
    LevelSelect(Protocol),
}

/// Selection state for one hub entry.
///
/// Re-entering the hub (for example after a skip while already there)
/// starts a fresh session via [`HubSession::restart`].
pub struct HubSession {
    id: Uuid,
    state: HubState,
    catalog: Arc<MissionCatalog>,
    vault_duration: Duration,
    navigator: Box<dyn Navigator>,
    failed_attempts: u32,
}

impl HubSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(
        catalog: Arc<MissionCatalog>,
        vault_duration: Duration,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: HubState::Idle,
            catalog,
            vault_duration,
            navigator,
            failed_attempts: 0,
        }
    }

    /// Returns the session id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current selection state.
    #[must_use]
    pub const fn state(&self) -> HubState {
        self.state
    }

    /// Returns how many access codes were rejected in this session.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Replaces the redirect side effect.
    pub fn set_navigator(&mut self, navigator: Box<dyn Navigator>) {
        self.navigator = navigator;
    }

    /// Starts a new session: closes every modal and clears messages.
    pub fn restart<R: Renderer>(&mut self, stage: &mut Stage<R>) {
        self.id = Uuid::new_v4();
        self.state = HubState::Idle;
        self.failed_attempts = 0;
        for target in [Target::LevelModal, Target::VaultModal, Target::AccessPrompt] {
            stage.emit(Directive::hide(target));
        }
        stage.emit(Directive::ClearText(Target::AccessMessage));
        info!(session = %self.id, "hub session started");
    }

    /// Handles one user event.
    ///
    /// `Skip` and `Quit` belong to the controller and are ignored here.
    pub async fn handle<R: Renderer>(
        &mut self,
        event: UserEvent,
        stage: &mut Stage<R>,
        token: &CancellationToken,
    ) {
        match event {
            UserEvent::SelectProtocol(protocol) => self.select_protocol(protocol, stage),
            UserEvent::SubmitAccessCode(code) => {
                let _ = self.submit_access_code(&code, stage, token).await;
            }
            UserEvent::Acknowledge if self.state == HubState::AwaitingCode => {
                let _ = self.submit_access_code("", stage, token).await;
            }
            UserEvent::Text(text) if self.state == HubState::AwaitingCode => {
                let _ = self.submit_access_code(&text, stage, token).await;
            }
            UserEvent::Text(text) => {
                let mut notice = format!("COMANDO DESCONOCIDO: '{text}'");
                if let Some(suggestion) = input::suggest_command(&text) {
                    let _ = write!(notice, " (¿quisiste decir '{suggestion}'?)");
                }
                stage.emit(Directive::SetText(Target::Notice, notice));
            }
            UserEvent::SelectLevel(level) => {
                let _ = self.select_level(&level, stage);
            }
            UserEvent::CloseModal => self.close_modal(stage),
            UserEvent::Acknowledge | UserEvent::Skip | UserEvent::Quit => {
                debug!(?event, state = ?self.state, "event ignored by hub session");
            }
        }
    }

    /// Opens a protocol: the level modal for protocol 1, the access code
    /// prompt for protocol 2.
    pub fn select_protocol<R: Renderer>(&mut self, protocol: Protocol, stage: &mut Stage<R>) {
        info!(session = %self.id, %protocol, "protocol selected");
        stage.emit(Directive::Cue(Cue::Ui));
        self.hide_modals(stage);

        if protocol.is_gated() {
            self.state = HubState::AwaitingCode;
            stage.emit(Directive::ClearText(Target::AccessMessage));
            stage.emit(Directive::show(Target::AccessPrompt));
        } else {
            self.open_level_modal(protocol, stage);
        }
    }

    /// Checks an access code. A valid code plays the vault animation and
    /// opens the protocol 2 level modal.
    ///
    /// The vault wait observes `token`; if it is cancelled the session is
    /// left for the controller to restart.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the session stays usable either way.
    pub async fn submit_access_code<R: Renderer>(
        &mut self,
        code: &str,
        stage: &mut Stage<R>,
        token: &CancellationToken,
    ) -> Result<(), AccessCodeError> {
        if let Err(reason) = gate::check_access_code(code) {
            self.failed_attempts += 1;
            debug!(session = %self.id, %reason, attempts = self.failed_attempts, "access code rejected");
            stage.emit(Directive::Cue(Cue::Error));
            match reason {
                AccessCodeError::Empty => {
                    self.state = HubState::AwaitingCode;
                    stage.emit(Directive::show(Target::AccessPrompt));
                    stage.emit(Directive::SetText(
                        Target::AccessMessage,
                        EMPTY_CODE_MESSAGE.to_string(),
                    ));
                }
                AccessCodeError::Invalid => {
                    self.state = HubState::Idle;
                    stage.emit(Directive::hide(Target::AccessPrompt));
                    stage.emit(Directive::SetText(
                        Target::AccessMessage,
                        format!("CÓDIGO DE ACCESO INVÁLIDO. Formato requerido: {FORMAT_HINT}"),
                    ));
                }
            }
            return Err(reason);
        }

        info!(session = %self.id, "access code accepted");
        stage.emit(Directive::Cue(Cue::Success));
        stage.emit(Directive::hide(Target::AccessPrompt));
        stage.emit(Directive::ClearText(Target::AccessMessage));
        self.hide_modals(stage);
        self.state = HubState::Vault;
        stage.emit(Directive::show(Target::VaultModal));

        if stage.pause(self.vault_duration, token).await == PhaseOutcome::Interrupted {
            debug!(session = %self.id, "vault animation interrupted");
            return Ok(());
        }

        stage.emit(Directive::hide(Target::VaultModal));
        self.open_level_modal(Protocol::Two, stage);
        Ok(())
    }

    /// Redirects to the chosen level of the open protocol.
    ///
    /// Returns the URL, or `None` if no level modal is open or the level is
    /// not in the catalog. A failing navigator is logged, not propagated.
    pub fn select_level<R: Renderer>(&mut self, level: &str, stage: &mut Stage<R>) -> Option<String> {
        let HubState::LevelSelect(protocol) = self.state else {
            debug!(level, state = ?self.state, "no level modal open");
            stage.emit(Directive::SetText(
                Target::Notice,
                "SELECCIONE PRIMERO UN PROTOCOLO (1 o 2).".to_string(),
            ));
            return None;
        };

        let Some(url) = self.catalog.url(protocol, level).map(str::to_string) else {
            warn!(%protocol, level, "level not in mission catalog");
            stage.emit(Directive::SetText(
                Target::Notice,
                format!("RANGO NO DISPONIBLE: '{level}'"),
            ));
            return None;
        };

        info!(session = %self.id, %protocol, level, url, "redirecting to mission");
        stage.emit(Directive::Cue(Cue::Ui));
        stage.emit(Directive::SetText(
            Target::Redirect,
            format!("REDIRIGIENDO A MISIÓN {protocol}, RANGO {level}: {url}"),
        ));
        if let Err(e) = self.navigator.open(&url) {
            warn!(error = %e, url, "failed to open mission URL");
        }
        stage.emit(Directive::hide(Target::LevelModal));
        self.state = HubState::Idle;
        Some(url)
    }

    /// Closes any open modal or prompt.
    pub fn close_modal<R: Renderer>(&mut self, stage: &mut Stage<R>) {
        self.hide_modals(stage);
        stage.emit(Directive::hide(Target::AccessPrompt));
        self.state = HubState::Idle;
    }

    fn hide_modals<R: Renderer>(&self, stage: &mut Stage<R>) {
        match self.state {
            HubState::LevelSelect(_) => stage.emit(Directive::hide(Target::LevelModal)),
            HubState::Vault => stage.emit(Directive::hide(Target::VaultModal)),
            HubState::Idle | HubState::AwaitingCode => {}
        }
    }

    fn open_level_modal<R: Renderer>(&mut self, protocol: Protocol, stage: &mut Stage<R>) {
        stage.emit(Directive::SetText(
            Target::ModalTitle,
            format!("SELECCIONAR RANGO DE MISIÓN - PROTOCOLO {protocol}"),
        ));

        let mut menu = String::new();
        for (index, level) in self.catalog.levels(protocol).keys().enumerate() {
            let letter = char::from(b'a' + u8::try_from(index % 26).unwrap_or(0));
            let _ = writeln!(menu, "  {letter}) {level}");
        }
        menu.push_str("  x) cerrar");
        stage.emit(Directive::SetText(Target::LevelModal, menu));
        stage.emit(Directive::show(Target::LevelModal));

        self.state = HubState::LevelSelect(protocol);
        debug!(session = %self.id, %protocol, "level modal open");
    }
}

impl std::fmt::Debug for HubSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("failed_attempts", &self.failed_attempts)
            .finish_non_exhaustive()
    }
}
