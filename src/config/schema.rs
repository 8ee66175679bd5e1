//! Script configuration types.
//!
//! A script file is YAML. Every section is optional and falls back to the
//! built-in AURORA narrative, timings and mission catalog.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hub::MissionCatalog;

// ============================================================================
// Top-Level Script
// ============================================================================

/// Root of a script file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    /// Text revealed during the sequence
    pub narrative: Narrative,

    /// Delays and pulse counts for each phase
    pub timing: Timing,

    /// Atmospheric flicker settings
    pub effects: EffectsConfig,

    /// Mission URLs per protocol and level
    pub missions: MissionCatalog,
}

impl Script {
    /// Returns a copy with every delay multiplied by `factor`.
    ///
    /// `0.0` makes the whole sequence instant. Negative or non-finite
    /// factors are treated as `1.0`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            timing: self.timing.scaled(factor),
            effects: self.effects.scaled(factor),
            ..self.clone()
        }
    }
}

// ============================================================================
// Narrative
// ============================================================================

/// Narrative text for the boot, crisis and briefing phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Narrative {
    /// Lines typed one by one during boot
    pub boot_sequence: Vec<String>,

    /// Status text shown when the crisis starts
    pub alert_text: String,

    /// Mission briefing typed before the ready button appears
    pub briefing_text: String,
}

impl Default for Narrative {
    fn default() -> Self {
        Self {
            boot_sequence: [
                "> INICIANDO PROTOCOLO DE ENLACE CUÁNTICO...",
                "> ESTABLECIENDO CONEXIÓN CON MARS DEEP SPACE NETWORK...",
                "> CONEXIÓN ESTABLECIDA.",
                "> CARGANDO INTERFAZ DE CONTROL DE MISIÓN A.U.R.O.R.A. v3.4...",
                "> BIENVENIDO, CADETE.",
            ]
            .map(String::from)
            .to_vec(),
            alert_text: "¡ALERTA! ¡SEÑAL CRÍTICA!".to_string(),
            briefing_text: "CADETE, TENEMOS UNA SITUACIÓN CRÍTICA. EL SISTEMA A.U.R.O.R.A. \
                (AUTOMATED UTILITY FOR RECONNAISSANCE AND ORBITAL RESEARCH ACTIVITIES) HA SUFRIDO \
                DAÑOS SEVEROS TRAS UNA TORMENTA SOLAR INESPERADA. NUESTRAS MISIONES DE \
                EXPLORACIÓN EN MARTE DEPENDEN DE ESTE SISTEMA. SIN A.U.R.O.R.A., PERDEMOS \
                CONTACTO CON NUESTRAS BASES Y ROVERS EN EL PLANETA ROJO. NECESITAMOS QUE \
                EJECUTES LOS PROTOCOLOS DE RECUPERACIÓN INMEDIATAMENTE. ¿ESTÁS PREPARADO/A \
                PARA ESTA MISIÓN?"
                .to_string(),
        }
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Phase timings.
///
/// Durations are written as `humantime` strings (`"800ms"`, `"2s 500ms"`) or
/// integer milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timing {
    /// Delay per character of boot text
    #[serde(with = "duration")]
    pub typewriter_speed: Duration,

    /// Pause after each boot line
    #[serde(with = "duration")]
    pub boot_line_delay: Duration,

    /// Hold after the last boot line
    #[serde(with = "duration")]
    pub boot_hold: Duration,

    /// Time spent on the system check
    #[serde(with = "duration")]
    pub system_dwell: Duration,

    /// Alarm hold before the glitch pulses
    #[serde(with = "duration")]
    pub alarm_duration: Duration,

    /// Number of glitch toggles
    pub glitch_pulses: u32,

    /// Shortest interval before a glitch toggle
    #[serde(with = "duration")]
    pub glitch_min: Duration,

    /// Longest interval before a glitch toggle
    #[serde(with = "duration")]
    pub glitch_max: Duration,

    /// Hold after the last pulse
    #[serde(with = "duration")]
    pub crisis_hold: Duration,

    /// Delay per character of briefing text
    #[serde(with = "duration")]
    pub briefing_speed: Duration,

    /// Vault animation before the protocol 2 level modal
    #[serde(with = "duration")]
    pub vault_duration: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            typewriter_speed: Duration::from_millis(30),
            boot_line_delay: Duration::from_millis(800),
            boot_hold: Duration::from_secs(2),
            system_dwell: Duration::from_secs(6),
            alarm_duration: Duration::from_millis(2500),
            glitch_pulses: 8,
            glitch_min: Duration::from_millis(150),
            glitch_max: Duration::from_millis(350),
            crisis_hold: Duration::from_secs(2),
            briefing_speed: Duration::from_millis(25),
            vault_duration: Duration::from_secs(2),
        }
    }
}

impl Timing {
    /// Returns a copy with every duration multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let s = |d: Duration| scale(d, factor);
        Self {
            typewriter_speed: s(self.typewriter_speed),
            boot_line_delay: s(self.boot_line_delay),
            boot_hold: s(self.boot_hold),
            system_dwell: s(self.system_dwell),
            alarm_duration: s(self.alarm_duration),
            glitch_pulses: self.glitch_pulses,
            glitch_min: s(self.glitch_min),
            glitch_max: s(self.glitch_max),
            crisis_hold: s(self.crisis_hold),
            briefing_speed: s(self.briefing_speed),
            vault_duration: s(self.vault_duration),
        }
    }
}

// ============================================================================
// Effects
// ============================================================================

/// One randomized flicker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flicker {
    /// Time between rolls
    #[serde(with = "duration")]
    pub interval: Duration,

    /// Chance of flickering on each roll, `0.0..=1.0`
    pub probability: f64,

    /// How long one flicker lasts
    #[serde(with = "duration")]
    pub duration: Duration,
}

/// Atmospheric effect settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectsConfig {
    /// Master switch
    pub enabled: bool,

    /// Delay before the first roll
    #[serde(with = "duration")]
    pub start_delay: Duration,

    /// Dims the scanline overlay
    pub scanline: Flicker,

    /// Brightens the whole screen
    pub screen: Flicker,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_delay: Duration::from_secs(1),
            scanline: Flicker {
                interval: Duration::from_millis(1500),
                probability: 0.08,
                duration: Duration::from_millis(80),
            },
            screen: Flicker {
                interval: Duration::from_millis(800),
                probability: 0.03,
                duration: Duration::from_millis(40),
            },
        }
    }
}

impl EffectsConfig {
    /// Returns a copy with every duration multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let flicker = |f: &Flicker| Flicker {
            interval: scale(f.interval, factor),
            probability: f.probability,
            duration: scale(f.duration, factor),
        };
        Self {
            enabled: self.enabled,
            start_delay: scale(self.start_delay, factor),
            scanline: flicker(&self.scanline),
            screen: flicker(&self.screen),
        }
    }
}

fn scale(d: Duration, factor: f64) -> Duration {
    if !factor.is_finite() || factor < 0.0 {
        return d;
    }
    Duration::try_from_secs_f64(d.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

// ============================================================================
// Duration serde
// ============================================================================

/// Serde adapter for durations: `humantime` strings or integer milliseconds.
pub mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    /// Serializes as a `humantime` string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    /// Deserializes from a `humantime` string or integer milliseconds.
    ///
    /// # Errors
    ///
    /// Fails on strings `humantime` cannot parse.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
            Raw::Text(text) => humantime::parse_duration(text.trim()).map_err(|e| {
                serde::de::Error::custom(format!("invalid duration '{text}': {e}"))
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
