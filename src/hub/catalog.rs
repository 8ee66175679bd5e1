//! Mission catalog: where each protocol level redirects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One of the two hub protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    /// Open protocol
    One,
    /// Protocol gated by the access code
    Two,
}

impl Protocol {
    /// Both protocols in display order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Returns the protocol number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Returns whether this protocol needs an access code.
    #[must_use]
    pub const fn is_gated(self) -> bool {
        matches!(self, Self::Two)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Level id to URL, in display order.
pub type LevelUrls = IndexMap<String, String>;

/// Mapping from `(protocol, level)` to an external mission URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissionCatalog {
    /// Levels of protocol 1
    #[serde(default = "default_mission1")]
    pub mission1: LevelUrls,
    /// Levels of protocol 2
    #[serde(default = "default_mission2")]
    pub mission2: LevelUrls,
}

impl Default for MissionCatalog {
    fn default() -> Self {
        Self {
            mission1: default_mission1(),
            mission2: default_mission2(),
        }
    }
}

impl MissionCatalog {
    /// Returns the levels of a protocol.
    #[must_use]
    pub const fn levels(&self, protocol: Protocol) -> &LevelUrls {
        match protocol {
            Protocol::One => &self.mission1,
            Protocol::Two => &self.mission2,
        }
    }

    /// Resolves the URL for a protocol level.
    #[must_use]
    pub fn url(&self, protocol: Protocol, level: &str) -> Option<&str> {
        self.levels(protocol).get(level).map(String::as_str)
    }

    /// Returns every level id across both protocols, first-seen order.
    #[must_use]
    pub fn level_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for protocol in Protocol::ALL {
            for level in self.levels(protocol).keys() {
                if !ids.contains(level) {
                    ids.push(level.clone());
                }
            }
        }
        ids
    }
}

const LEVELS: [(&str, &str); 4] = [
    ("primaria_baja", "PB"),
    ("primaria_alta", "PA"),
    ("secundaria", "S"),
    ("preparatoria", "H"),
];

fn default_levels(mission: u8) -> LevelUrls {
    LEVELS
        .iter()
        .map(|(level, suffix)| {
            (
                (*level).to_string(),
                format!("https://gnius-club.github.io/AURORA_M{mission}_{suffix}"),
            )
        })
        .collect()
}

fn default_mission1() -> LevelUrls {
    default_levels(1)
}

fn default_mission2() -> LevelUrls {
    default_levels(2)
}
