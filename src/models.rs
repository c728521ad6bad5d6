use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Every combat log event tag this parser knows how to lay out.
///
/// Tags outside this set still produce a record, tagged `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    DamageShield,
    DamageShieldMissed,
    DamageSplit,
    EnchantApplied,
    EnchantRemoved,
    EnvironmentalDamage,
    PartyKill,
    RangeDamage,
    RangeMissed,
    SpellAuraApplied,
    SpellAuraAppliedDose,
    SpellAuraRefresh,
    SpellAuraRemoved,
    SpellAuraRemovedDose,
    SpellCastFailed,
    SpellCastStart,
    SpellCastSuccess,
    SpellCreate,
    SpellDamage,
    SpellDispel,
    SpellDrain,
    SpellEnergize,
    SpellExtraAttacks,
    SpellHeal,
    SpellInterrupt,
    SpellInstakill,
    SpellMissed,
    SpellPeriodicDamage,
    SpellPeriodicEnergize,
    SpellPeriodicHeal,
    SpellPeriodicLeech,
    SpellPeriodicMissed,
    SpellResurrect,
    SpellSummon,
    SwingDamage,
    SwingMissed,
    UnitDied,
    Unknown,
}

impl EventType {
    /// All known tags, in log-name order. `Unknown` is not included.
    pub const ALL: [EventType; 37] = [
        EventType::DamageShield,
        EventType::DamageShieldMissed,
        EventType::DamageSplit,
        EventType::EnchantApplied,
        EventType::EnchantRemoved,
        EventType::EnvironmentalDamage,
        EventType::PartyKill,
        EventType::RangeDamage,
        EventType::RangeMissed,
        EventType::SpellAuraApplied,
        EventType::SpellAuraAppliedDose,
        EventType::SpellAuraRefresh,
        EventType::SpellAuraRemoved,
        EventType::SpellAuraRemovedDose,
        EventType::SpellCastFailed,
        EventType::SpellCastStart,
        EventType::SpellCastSuccess,
        EventType::SpellCreate,
        EventType::SpellDamage,
        EventType::SpellDispel,
        EventType::SpellDrain,
        EventType::SpellEnergize,
        EventType::SpellExtraAttacks,
        EventType::SpellHeal,
        EventType::SpellInterrupt,
        EventType::SpellInstakill,
        EventType::SpellMissed,
        EventType::SpellPeriodicDamage,
        EventType::SpellPeriodicEnergize,
        EventType::SpellPeriodicHeal,
        EventType::SpellPeriodicLeech,
        EventType::SpellPeriodicMissed,
        EventType::SpellResurrect,
        EventType::SpellSummon,
        EventType::SwingDamage,
        EventType::SwingMissed,
        EventType::UnitDied,
    ];

    /// Map a raw log tag to its event type. Unrecognized tags map to `Unknown`.
    pub fn from_tag(tag: &str) -> EventType {
        match tag {
            "DAMAGE_SHIELD" => EventType::DamageShield,
            "DAMAGE_SHIELD_MISSED" => EventType::DamageShieldMissed,
            "DAMAGE_SPLIT" => EventType::DamageSplit,
            "ENCHANT_APPLIED" => EventType::EnchantApplied,
            "ENCHANT_REMOVED" => EventType::EnchantRemoved,
            "ENVIRONMENTAL_DAMAGE" => EventType::EnvironmentalDamage,
            "PARTY_KILL" => EventType::PartyKill,
            "RANGE_DAMAGE" => EventType::RangeDamage,
            "RANGE_MISSED" => EventType::RangeMissed,
            "SPELL_AURA_APPLIED" => EventType::SpellAuraApplied,
            "SPELL_AURA_APPLIED_DOSE" => EventType::SpellAuraAppliedDose,
            "SPELL_AURA_REFRESH" => EventType::SpellAuraRefresh,
            "SPELL_AURA_REMOVED" => EventType::SpellAuraRemoved,
            "SPELL_AURA_REMOVED_DOSE" => EventType::SpellAuraRemovedDose,
            "SPELL_CAST_FAILED" => EventType::SpellCastFailed,
            "SPELL_CAST_START" => EventType::SpellCastStart,
            "SPELL_CAST_SUCCESS" => EventType::SpellCastSuccess,
            "SPELL_CREATE" => EventType::SpellCreate,
            "SPELL_DAMAGE" => EventType::SpellDamage,
            "SPELL_DISPEL" => EventType::SpellDispel,
            "SPELL_DRAIN" => EventType::SpellDrain,
            "SPELL_ENERGIZE" => EventType::SpellEnergize,
            "SPELL_EXTRA_ATTACKS" => EventType::SpellExtraAttacks,
            "SPELL_HEAL" => EventType::SpellHeal,
            "SPELL_INTERRUPT" => EventType::SpellInterrupt,
            "SPELL_INSTAKILL" => EventType::SpellInstakill,
            "SPELL_MISSED" => EventType::SpellMissed,
            "SPELL_PERIODIC_DAMAGE" => EventType::SpellPeriodicDamage,
            "SPELL_PERIODIC_ENERGIZE" => EventType::SpellPeriodicEnergize,
            "SPELL_PERIODIC_HEAL" => EventType::SpellPeriodicHeal,
            "SPELL_PERIODIC_LEECH" => EventType::SpellPeriodicLeech,
            "SPELL_PERIODIC_MISSED" => EventType::SpellPeriodicMissed,
            "SPELL_RESURRECT" => EventType::SpellResurrect,
            "SPELL_SUMMON" => EventType::SpellSummon,
            "SWING_DAMAGE" => EventType::SwingDamage,
            "SWING_MISSED" => EventType::SwingMissed,
            "UNIT_DIED" => EventType::UnitDied,
            _ => EventType::Unknown,
        }
    }

    /// The tag as it appears in the log
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::DamageShield => "DAMAGE_SHIELD",
            EventType::DamageShieldMissed => "DAMAGE_SHIELD_MISSED",
            EventType::DamageSplit => "DAMAGE_SPLIT",
            EventType::EnchantApplied => "ENCHANT_APPLIED",
            EventType::EnchantRemoved => "ENCHANT_REMOVED",
            EventType::EnvironmentalDamage => "ENVIRONMENTAL_DAMAGE",
            EventType::PartyKill => "PARTY_KILL",
            EventType::RangeDamage => "RANGE_DAMAGE",
            EventType::RangeMissed => "RANGE_MISSED",
            EventType::SpellAuraApplied => "SPELL_AURA_APPLIED",
            EventType::SpellAuraAppliedDose => "SPELL_AURA_APPLIED_DOSE",
            EventType::SpellAuraRefresh => "SPELL_AURA_REFRESH",
            EventType::SpellAuraRemoved => "SPELL_AURA_REMOVED",
            EventType::SpellAuraRemovedDose => "SPELL_AURA_REMOVED_DOSE",
            EventType::SpellCastFailed => "SPELL_CAST_FAILED",
            EventType::SpellCastStart => "SPELL_CAST_START",
            EventType::SpellCastSuccess => "SPELL_CAST_SUCCESS",
            EventType::SpellCreate => "SPELL_CREATE",
            EventType::SpellDamage => "SPELL_DAMAGE",
            EventType::SpellDispel => "SPELL_DISPEL",
            EventType::SpellDrain => "SPELL_DRAIN",
            EventType::SpellEnergize => "SPELL_ENERGIZE",
            EventType::SpellExtraAttacks => "SPELL_EXTRA_ATTACKS",
            EventType::SpellHeal => "SPELL_HEAL",
            EventType::SpellInterrupt => "SPELL_INTERRUPT",
            EventType::SpellInstakill => "SPELL_INSTAKILL",
            EventType::SpellMissed => "SPELL_MISSED",
            EventType::SpellPeriodicDamage => "SPELL_PERIODIC_DAMAGE",
            EventType::SpellPeriodicEnergize => "SPELL_PERIODIC_ENERGIZE",
            EventType::SpellPeriodicHeal => "SPELL_PERIODIC_HEAL",
            EventType::SpellPeriodicLeech => "SPELL_PERIODIC_LEECH",
            EventType::SpellPeriodicMissed => "SPELL_PERIODIC_MISSED",
            EventType::SpellResurrect => "SPELL_RESURRECT",
            EventType::SpellSummon => "SPELL_SUMMON",
            EventType::SwingDamage => "SWING_DAMAGE",
            EventType::SwingMissed => "SWING_MISSED",
            EventType::UnitDied => "UNIT_DIED",
            EventType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spell school bitmask. Combined schools are the OR of their parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SpellSchool(pub u32);

impl SpellSchool {
    pub const PHYSICAL: SpellSchool = SpellSchool(1);
    pub const HOLY: SpellSchool = SpellSchool(2);
    pub const FIRE: SpellSchool = SpellSchool(4);
    pub const NATURE: SpellSchool = SpellSchool(8);
    pub const FROST: SpellSchool = SpellSchool(16);
    pub const SHADOW: SpellSchool = SpellSchool(32);
    pub const ARCANE: SpellSchool = SpellSchool(64);

    /// Display name for single and well-known combined schools
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Physical",
            2 => "Holy",
            4 => "Fire",
            8 => "Nature",
            16 => "Frost",
            32 => "Shadow",
            64 => "Arcane",
            3 => "Holystrike",
            5 => "Flamestrike",
            6 => "Radiant",
            9 => "Stormstrike",
            10 => "Holystorm",
            12 => "Volcanic",
            17 => "Froststrike",
            18 => "Holyfrost",
            20 => "Frostfire",
            24 => "Froststorm",
            33 => "Shadowstrike",
            34 => "Twilight",
            36 => "Shadowflame",
            40 => "Plague",
            48 => "Shadowfrost",
            65 => "Spellstrike",
            66 => "Divine",
            68 => "Spellfire",
            72 => "Astral",
            80 => "Spellfrost",
            96 => "Spellshadow",
            28 => "Elemental",
            62 => "Chromatic",
            106 => "Cosmic",
            124 => "Chaos",
            126 => "Magic",
            127 => "Fel",
            _ => "unknown",
        }
    }
}

impl fmt::Display for SpellSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource type affected by energize and leech events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PowerType(pub i64);

impl PowerType {
    pub fn name(self) -> &'static str {
        match self.0 {
            -2 => "Health cost",
            -1 => "None",
            0 => "Mana",
            1 => "Rage",
            2 => "Focus",
            3 => "Energy",
            4 => "Combo Points",
            5 => "Runes",
            6 => "Runic Power",
            7 => "Soul Shards",
            _ => "N/A",
        }
    }
}

impl fmt::Display for PowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuraType {
    Buff,
    Debuff,
}

impl AuraType {
    pub fn from_token(token: &str) -> Option<AuraType> {
        match token {
            "BUFF" => Some(AuraType::Buff),
            "DEBUFF" => Some(AuraType::Debuff),
            _ => None,
        }
    }
}

/// Cause of ENVIRONMENTAL_DAMAGE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentalType {
    Drowning,
    Falling,
    Fatigue,
    Fire,
    Lava,
    Slime,
}

impl EnvironmentalType {
    pub fn from_token(token: &str) -> Option<EnvironmentalType> {
        match token {
            "DROWNING" => Some(EnvironmentalType::Drowning),
            "FALLING" => Some(EnvironmentalType::Falling),
            "FATIGUE" => Some(EnvironmentalType::Fatigue),
            "FIRE" => Some(EnvironmentalType::Fire),
            "LAVA" => Some(EnvironmentalType::Lava),
            "SLIME" => Some(EnvironmentalType::Slime),
            _ => None,
        }
    }
}

/// Fields shared by every line in the combat log
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Header {
    pub timestamp: NaiveDateTime,
    pub event_type: EventType,
    pub source_id: String,
    pub source_name: String,
    pub target_id: String,
    pub target_name: String,
}

/// Spell metadata for SPELL_ and RANGE_ events
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SpellPrefix {
    pub spell_id: u64,
    pub spell_name: String,
    pub spell_school: SpellSchool,
}

/// Item enchant metadata for ENCHANT_ events
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EnchantPrefix {
    pub spell_name: String,
    pub item_id: u64,
    pub item_name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EnvironmentalPrefix {
    pub environmental_type: EnvironmentalType,
}

/// Event metadata preceding the effect fields. At most one shape per record.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub enum Prefix {
    #[default]
    None,
    Spell(SpellPrefix),
    Enchant(EnchantPrefix),
    Environmental(EnvironmentalPrefix),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    None,
    Spell,
    Enchant,
    Environmental,
}

impl PrefixKind {
    /// Number of fields this prefix consumes
    pub const fn width(self) -> usize {
        match self {
            PrefixKind::None => 0,
            PrefixKind::Spell | PrefixKind::Enchant => 3,
            PrefixKind::Environmental => 1,
        }
    }
}

impl Prefix {
    pub fn kind(&self) -> PrefixKind {
        match self {
            Prefix::None => PrefixKind::None,
            Prefix::Spell(_) => PrefixKind::Spell,
            Prefix::Enchant(_) => PrefixKind::Enchant,
            Prefix::Environmental(_) => PrefixKind::Environmental,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DamageSuffix {
    pub amount: u64,
    /// -1 or 0 when the hit did not kill
    pub overkill: i64,
    pub spell_school: SpellSchool,
    pub resisted: u64,
    pub blocked: u64,
    pub absorbed: u64,
    pub critical: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HealSuffix {
    pub amount: u64,
    pub overhealing: u64,
    pub absorbed: u64,
    pub critical: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MissSuffix {
    /// MISS, DODGE, PARRY, ABSORB, RESIST, ...
    pub miss_type: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuraSuffix {
    pub aura_type: AuraType,
}

/// Power gained (or lost, when negative)
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EnergizeSuffix {
    pub amount: i64,
    pub power_type: PowerType,
}

/// The spell that was interrupted
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InterruptSuffix {
    pub extra_spell_id: u64,
    pub extra_spell_name: String,
    pub extra_spell_school: SpellSchool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ExtraAttacksSuffix {
    pub amount: u64,
}

/// The aura that was dispelled or stolen
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DispelOrStealSuffix {
    pub extra_spell_id: u64,
    pub extra_spell_name: String,
    pub extra_spell_school: SpellSchool,
    pub aura_type: AuraType,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LeechOrDrainSuffix {
    pub amount: u64,
    pub power_type: PowerType,
    pub extra_amount: u64,
}

/// Effect metadata following the prefix. At most one shape per record.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub enum Suffix {
    #[default]
    None,
    Damage(DamageSuffix),
    Heal(HealSuffix),
    Miss(MissSuffix),
    Aura(AuraSuffix),
    Energize(EnergizeSuffix),
    Interrupt(InterruptSuffix),
    ExtraAttacks(ExtraAttacksSuffix),
    DispelOrSteal(DispelOrStealSuffix),
    LeechOrDrain(LeechOrDrainSuffix),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    None,
    Damage,
    Heal,
    Miss,
    Aura,
    Energize,
    Interrupt,
    ExtraAttacks,
    DispelOrSteal,
    LeechOrDrain,
}

impl Suffix {
    pub fn kind(&self) -> SuffixKind {
        match self {
            Suffix::None => SuffixKind::None,
            Suffix::Damage(_) => SuffixKind::Damage,
            Suffix::Heal(_) => SuffixKind::Heal,
            Suffix::Miss(_) => SuffixKind::Miss,
            Suffix::Aura(_) => SuffixKind::Aura,
            Suffix::Energize(_) => SuffixKind::Energize,
            Suffix::Interrupt(_) => SuffixKind::Interrupt,
            Suffix::ExtraAttacks(_) => SuffixKind::ExtraAttacks,
            Suffix::DispelOrSteal(_) => SuffixKind::DispelOrSteal,
            Suffix::LeechOrDrain(_) => SuffixKind::LeechOrDrain,
        }
    }
}

/// A single parsed line of the combat log
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CombatLogRecord {
    #[serde(flatten)]
    pub header: Header,
    pub prefix: Prefix,
    pub suffix: Suffix,
}

impl CombatLogRecord {
    pub fn spell(&self) -> Option<&SpellPrefix> {
        match &self.prefix {
            Prefix::Spell(spell) => Some(spell),
            _ => None,
        }
    }

    pub fn damage(&self) -> Option<&DamageSuffix> {
        match &self.suffix {
            Suffix::Damage(damage) => Some(damage),
            _ => None,
        }
    }

    pub fn heal(&self) -> Option<&HealSuffix> {
        match &self.suffix {
            Suffix::Heal(heal) => Some(heal),
            _ => None,
        }
    }

    pub fn extra_attacks(&self) -> Option<&ExtraAttacksSuffix> {
        match &self.suffix {
            Suffix::ExtraAttacks(extra) => Some(extra),
            _ => None,
        }
    }
}

/// First and last bucketed timestamp at which a boss took damage
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct EncounterSpan {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Raid metrics aggregated over a whole record stream
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SummaryStats {
    /// Player damage to NPCs and bosses, per time bucket
    #[serde(rename = "damage_done")]
    pub damage_done_over_time: BTreeMap<NaiveDateTime, u64>,
    #[serde(rename = "healing_done")]
    pub healing_done_over_time: BTreeMap<NaiveDateTime, u64>,
    /// NPC and boss damage to players, per time bucket
    #[serde(rename = "damage_taken")]
    pub damage_taken_over_time: BTreeMap<NaiveDateTime, u64>,
    /// Boss name -> observed encounter span
    #[serde(rename = "encounter_overlays")]
    pub encounters: HashMap<String, EncounterSpan>,
    pub damage_by_source: HashMap<String, u64>,
    pub healing_by_source: HashMap<String, u64>,
    /// Keyed by the NPC or boss dealing the damage
    pub damage_taken_by_source: HashMap<String, u64>,
    pub damage_taken_by_spell: HashMap<String, u64>,
    pub interrupts_by_source: HashMap<String, u64>,
    #[serde(rename = "dispells_by_source")]
    pub dispels_by_source: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_roundtrip() {
        for event in EventType::ALL {
            assert_eq!(EventType::from_tag(event.as_str()), event);
        }
        assert_eq!(EventType::from_tag("SPELL_ABSORBED"), EventType::Unknown);
    }

    #[test]
    fn test_spell_school_names() {
        assert_eq!(SpellSchool::FROST.name(), "Frost");
        assert_eq!(SpellSchool(48).name(), "Shadowfrost");
        assert_eq!(SpellSchool(0).name(), "unknown");
    }

    #[test]
    fn test_power_type_names() {
        assert_eq!(PowerType(6).to_string(), "Runic Power");
        assert_eq!(PowerType(-2).name(), "Health cost");
        assert_eq!(PowerType(42).name(), "N/A");
    }

    #[test]
    fn test_prefix_widths() {
        assert_eq!(PrefixKind::None.width(), 0);
        assert_eq!(PrefixKind::Spell.width(), 3);
        assert_eq!(PrefixKind::Enchant.width(), 3);
        assert_eq!(PrefixKind::Environmental.width(), 1);
    }

    #[test]
    fn test_summary_stats_json_keys() {
        let json = serde_json::to_value(SummaryStats::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "damage_done",
            "healing_done",
            "damage_taken",
            "encounter_overlays",
            "damage_by_source",
            "healing_by_source",
            "damage_taken_by_source",
            "damage_taken_by_spell",
            "interrupts_by_source",
            "dispells_by_source",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
    }
}
