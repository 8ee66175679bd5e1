//! ANSI terminal renderer.
//!
//! Maps directives onto a line-oriented terminal: typed text is written in
//! place, panels become banners, and classes become colors. The terminal
//! has no scanline overlay or screen filter, so directives addressed to
//! [`Target::Scanlines`] and [`Target::Screen`] report a missing target.

use std::collections::HashSet;
use std::io::Write;

use colored::Colorize;

use crate::error::{RenderError, RenderResult};
use crate::phase::Phase;

use super::{Class, Cue, Directive, Renderer, Target};

/// Colour roles used on the terminal.
#[derive(Debug, Clone, Copy)]
enum Tone {
    Alert,
    Ok,
    Accent,
    Muted,
}

/// Renderer writing to a terminal-like `Write` sink (usually stdout).
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
    bell: bool,
    /// Targets currently carrying `Class::Hidden`.
    hidden: HashSet<Target>,
    critical: bool,
    glitch: bool,
    at_line_start: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Creates a renderer over the given sink.
    ///
    /// Every toggleable element starts hidden, matching the initial page
    /// state of the terminal.
    pub fn new(out: W, color: bool, bell: bool) -> Self {
        let hidden = [
            Target::ErrorMessages,
            Target::ReadyButton,
            Target::SkipButton,
            Target::LevelModal,
            Target::VaultModal,
            Target::AccessPrompt,
        ]
        .into_iter()
        .collect();
        Self {
            out,
            color,
            bell,
            hidden,
            critical: false,
            glitch: false,
            at_line_start: true,
        }
    }

    /// Consumes the renderer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Alert => text.red().bold(),
            Tone::Ok => text.green(),
            Tone::Accent => text.cyan(),
            Tone::Muted => text.dimmed(),
        }
        .to_string()
    }

    fn write(&mut self, text: &str) -> std::io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }

    fn line(&mut self, text: &str) -> std::io::Result<()> {
        if !self.at_line_start {
            self.write("\n")?;
        }
        self.write(text)?;
        self.write("\n")
    }

    fn banner(&mut self, phase: Phase) -> std::io::Result<()> {
        let title = match phase {
            Phase::Boot => "A.U.R.O.R.A. // ENLACE CUÁNTICO",
            Phase::SystemCheck => "INTERFAZ DE CONTROL DE MISIÓN",
            // The crisis plays out on the system interface panel
            Phase::Crisis => return Ok(()),
            Phase::Briefing => "INFORME DE MISIÓN",
            Phase::Hub => "CENTRO DE PROTOCOLOS",
        };
        let rule = self.paint(Tone::Accent, &format!("══════ {title} ══════"));
        self.write(if self.at_line_start { "\n" } else { "\n\n" })?;
        self.line(&rule)?;
        if phase == Phase::SystemCheck {
            let status = self.paint(Tone::Ok, "ESTADO: SEÑAL ESTABLE");
            self.line(&status)?;
        }
        if phase == Phase::Hub {
            self.line("  [1] PROTOCOLO 1 :: RECUPERACIÓN DE ENLACE")?;
            self.line("  [2] PROTOCOLO 2 :: ACCESO RESTRINGIDO")?;
        }
        Ok(())
    }

    fn reveal(&mut self, target: Target) -> std::io::Result<()> {
        match target {
            Target::ErrorMessages => {
                let text = self.paint(Tone::Alert, "!! ERROR 0x5F: ENLACE ORBITAL DEGRADADO !!");
                self.line(&text)
            }
            Target::ReadyButton => {
                let text = self.paint(Tone::Ok, "[ ENTER ] ESTOY PREPARADO/A");
                self.line(&text)
            }
            Target::SkipButton => {
                let text = self.paint(Tone::Muted, "(escribe 's' + ENTER para saltar la introducción)");
                self.line(&text)
            }
            Target::VaultModal => {
                let text = self.paint(Tone::Accent, ">>> DESBLOQUEANDO BÓVEDA DE PROTOCOLO 2...");
                self.line(&text)
            }
            Target::AccessPrompt => self.line(
                "INGRESE CÓDIGO DE ACCESO PARA PROTOCOLO 2 (formato: AURORAxMxIxSxIxOxNx2):",
            ),
            _ => Ok(()),
        }
    }

    fn set_text(&mut self, target: Target, text: &str) -> std::io::Result<()> {
        let styled = match target {
            Target::StatusText if self.critical => self.paint(Tone::Alert, text),
            Target::AccessMessage => self.paint(Tone::Alert, text),
            Target::ModalTitle => self.paint(Tone::Accent, text),
            Target::Redirect => self.paint(Tone::Ok, text),
            Target::Notice => self.paint(Tone::Muted, text),
            _ => text.to_string(),
        };
        self.line(&styled)
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn apply(&mut self, directive: &Directive) -> RenderResult {
        if let Some(target @ (Target::Scanlines | Target::Screen)) = directive.target() {
            return Err(RenderError::MissingTarget(target));
        }

        match directive {
            Directive::ShowPhase(phase) => self.banner(*phase)?,
            Directive::ClearText(_) | Directive::NewLine(_) => {
                if !self.at_line_start {
                    self.write("\n")?;
                }
            }
            Directive::AppendChar(_, c) => {
                let mut buf = [0u8; 4];
                let s = c.encode_utf8(&mut buf);
                self.write(s)?;
            }
            Directive::AppendText(_, s) => self.write(s)?,
            Directive::SetText(t, s) => self.set_text(*t, s)?,
            Directive::AddClass(t, Class::Hidden) => {
                self.hidden.insert(*t);
            }
            Directive::RemoveClass(t, Class::Hidden) => {
                if self.hidden.remove(t) {
                    self.reveal(*t)?;
                }
            }
            Directive::AddClass(Target::SystemStatus, Class::Critical) => self.critical = true,
            Directive::RemoveClass(Target::SystemStatus, Class::Critical) => {
                self.critical = false;
            }
            Directive::AddClass(Target::SystemInterface, Class::GlitchActive)
            | Directive::ToggleClass(Target::SystemInterface, Class::GlitchActive) => {
                self.glitch = !self.glitch
                    || matches!(directive, Directive::AddClass(..));
                if self.glitch {
                    let noise = self.paint(Tone::Alert, "░▒▓");
                    self.write(&noise)?;
                }
            }
            Directive::AddClass(..) | Directive::RemoveClass(..) | Directive::ToggleClass(..) => {}
            Directive::Cue(Cue::Alarm) if self.bell => self.write("\x07")?,
            Directive::Cue(_) => {}
        }

        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for TerminalRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("color", &self.color)
            .field("bell", &self.bell)
            .field("critical", &self.critical)
            .finish_non_exhaustive()
    }
}
