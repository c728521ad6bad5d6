//! Lexical classification of event types and actors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::models::EventType;

/// Events that dealt damage
pub const DAMAGE_EVENTS: &[EventType] = &[
    EventType::DamageShield,
    EventType::DamageSplit,
    EventType::RangeDamage,
    EventType::SpellDamage,
    EventType::SpellDrain,
    EventType::SpellExtraAttacks,
    EventType::SpellInstakill,
    EventType::SpellPeriodicDamage,
    EventType::SpellPeriodicLeech,
    EventType::SwingDamage,
];

/// Events where healing was applied to a target
pub const HEAL_EVENTS: &[EventType] = &[
    EventType::SpellHeal,
    EventType::SpellPeriodicHeal,
    EventType::SpellPeriodicLeech,
];

/// Non-damage, non-healing events of interest
pub const OVERLAY_EVENTS: &[EventType] = &[
    EventType::SpellAuraApplied,
    EventType::SpellAuraAppliedDose,
    EventType::SpellAuraRemoved,
    EventType::SpellAuraRefresh,
    EventType::SpellAuraRemovedDose,
    EventType::SpellDispel,
    EventType::SpellInterrupt,
    EventType::UnitDied,
];

pub fn is_damage_event(event: EventType) -> bool {
    DAMAGE_EVENTS.contains(&event)
}

pub fn is_healing_event(event: EventType) -> bool {
    HEAL_EVENTS.contains(&event)
}

pub fn is_overlay_event(event: EventType) -> bool {
    OVERLAY_EVENTS.contains(&event)
}

/// Icecrown Citadel bosses
const DEFAULT_BOSS_NAMES: &[&str] = &[
    "Lord Marrowgar",
    "Lady Deathwhisper",
    "The Skybreaker",
    "Orgrim's Hammer",
    "Deathbringer Saurfang",
    "Rotface",
    "Festergut",
    "Professor Putricide",
    "Valithria Dreamwalker",
    "Sindragosa",
    "The Lich King",
];

const DEFAULT_BOSS_ID_PREFIX: &str = "0xF15";
const DEFAULT_NPC_ID_PREFIX: &str = "0xF13";
const DEFAULT_PLAYER_ID_PREFIX: &str = "0x07";

/// Game-world knowledge used to attribute actors: which names are raid
/// bosses, and which id prefixes mark bosses, NPCs and players.
///
/// Any key missing from a roster file keeps its built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub boss_names: Vec<String>,
    pub boss_id_prefix: String,
    pub npc_id_prefix: String,
    pub player_id_prefix: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            boss_names: DEFAULT_BOSS_NAMES.iter().map(|s| s.to_string()).collect(),
            boss_id_prefix: DEFAULT_BOSS_ID_PREFIX.to_string(),
            npc_id_prefix: DEFAULT_NPC_ID_PREFIX.to_string(),
            player_id_prefix: DEFAULT_PLAYER_ID_PREFIX.to_string(),
        }
    }
}

impl Roster {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_toml_str(&content).map_err(|source| RosterError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            bosses = roster.boss_names.len(),
            "Loaded roster"
        );
        Ok(roster)
    }

    /// Exact, case-sensitive match against the boss list
    pub fn is_boss_name(&self, name: &str) -> bool {
        self.boss_names.iter().any(|boss| boss == name)
    }

    pub fn is_boss_id(&self, id: &str) -> bool {
        id.starts_with(&self.boss_id_prefix)
    }

    pub fn is_npc_id(&self, id: &str) -> bool {
        id.starts_with(&self.npc_id_prefix)
    }

    pub fn is_player_id(&self, id: &str) -> bool {
        id.starts_with(&self.player_id_prefix)
    }
}
