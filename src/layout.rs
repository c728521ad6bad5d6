//! Positional field layout of every known event type.
//!
//! Fields 0-6 form the header. A prefix, when present, always starts at
//! field 7 and the suffix starts right after it, so for every entry
//! `suffix_offset == PREFIX_OFFSET + prefix.width()`.

use crate::models::{EventType, PrefixKind, SuffixKind};

/// First field after the header
pub const PREFIX_OFFSET: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub prefix: PrefixKind,
    pub suffix: SuffixKind,
    pub suffix_offset: usize,
}

const fn layout(prefix: PrefixKind, suffix: SuffixKind, suffix_offset: usize) -> FieldLayout {
    FieldLayout {
        prefix,
        suffix,
        suffix_offset,
    }
}

const BARE: FieldLayout = layout(PrefixKind::None, SuffixKind::None, 7);
const SWING_DAMAGE: FieldLayout = layout(PrefixKind::None, SuffixKind::Damage, 7);
const SWING_MISS: FieldLayout = layout(PrefixKind::None, SuffixKind::Miss, 7);
const ENVIRONMENTAL_DAMAGE: FieldLayout = layout(PrefixKind::Environmental, SuffixKind::Damage, 8);
const ENCHANT: FieldLayout = layout(PrefixKind::Enchant, SuffixKind::None, 10);
const SPELL: FieldLayout = layout(PrefixKind::Spell, SuffixKind::None, 10);
const SPELL_DAMAGE: FieldLayout = layout(PrefixKind::Spell, SuffixKind::Damage, 10);
const SPELL_MISS: FieldLayout = layout(PrefixKind::Spell, SuffixKind::Miss, 10);
const SPELL_AURA: FieldLayout = layout(PrefixKind::Spell, SuffixKind::Aura, 10);
const SPELL_HEAL: FieldLayout = layout(PrefixKind::Spell, SuffixKind::Heal, 10);
const SPELL_ENERGIZE: FieldLayout = layout(PrefixKind::Spell, SuffixKind::Energize, 10);
const SPELL_LEECH: FieldLayout = layout(PrefixKind::Spell, SuffixKind::LeechOrDrain, 10);

pub static FIELD_LAYOUTS: &[(EventType, FieldLayout)] = &[
    (EventType::UnitDied, BARE),
    (EventType::PartyKill, BARE),
    (EventType::SpellInstakill, BARE),
    (EventType::SwingDamage, SWING_DAMAGE),
    (EventType::SwingMissed, SWING_MISS),
    (EventType::EnvironmentalDamage, ENVIRONMENTAL_DAMAGE),
    (EventType::SpellDamage, SPELL_DAMAGE),
    (EventType::SpellPeriodicDamage, SPELL_DAMAGE),
    (EventType::DamageShield, SPELL_DAMAGE),
    (EventType::DamageSplit, SPELL_DAMAGE),
    (EventType::RangeDamage, SPELL_DAMAGE),
    (EventType::SpellDrain, SPELL_LEECH),
    (EventType::SpellPeriodicLeech, SPELL_LEECH),
    (EventType::RangeMissed, SPELL_MISS),
    (EventType::SpellMissed, SPELL_MISS),
    (EventType::SpellPeriodicMissed, SPELL_MISS),
    (EventType::DamageShieldMissed, SPELL_MISS),
    (EventType::SpellAuraApplied, SPELL_AURA),
    (EventType::SpellAuraAppliedDose, SPELL_AURA),
    (EventType::SpellAuraRemoved, SPELL_AURA),
    (EventType::SpellAuraRefresh, SPELL_AURA),
    (EventType::SpellAuraRemovedDose, SPELL),
    (EventType::SpellHeal, SPELL_HEAL),
    (EventType::SpellPeriodicHeal, SPELL_HEAL),
    (EventType::SpellEnergize, SPELL_ENERGIZE),
    (EventType::SpellPeriodicEnergize, SPELL_ENERGIZE),
    (
        EventType::SpellInterrupt,
        layout(PrefixKind::Spell, SuffixKind::Interrupt, 10),
    ),
    (
        EventType::SpellExtraAttacks,
        layout(PrefixKind::Spell, SuffixKind::ExtraAttacks, 10),
    ),
    (
        EventType::SpellDispel,
        layout(PrefixKind::Spell, SuffixKind::DispelOrSteal, 10),
    ),
    (EventType::SpellCastStart, SPELL),
    (EventType::SpellCastFailed, SPELL),
    (EventType::SpellCastSuccess, SPELL),
    (EventType::SpellCreate, SPELL),
    (EventType::SpellResurrect, SPELL),
    (EventType::SpellSummon, SPELL),
    (EventType::EnchantApplied, ENCHANT),
    (EventType::EnchantRemoved, ENCHANT),
];

/// Layout for an event type. `None` only for `EventType::Unknown`.
pub fn layout_for(event: EventType) -> Option<FieldLayout> {
    FIELD_LAYOUTS
        .iter()
        .find(|(e, _)| *e == event)
        .map(|(_, layout)| *layout)
}
