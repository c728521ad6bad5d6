use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::classify::{is_damage_event, is_healing_event, is_overlay_event, Roster};
use crate::models::*;

/// Default width of an over-time bucket
pub const DEFAULT_RESOLUTION: Duration = Duration::from_secs(30);

/// How overlay events feed the interrupt and dispel counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayCounting {
    /// SPELL_INTERRUPT counts an interrupt, SPELL_DISPEL counts a dispel
    #[default]
    ByEventType,
    /// Every overlay event (auras and deaths included) bumps both counters
    Legacy,
}

/// Aggregates a record stream into raid metrics
#[derive(Debug, Clone)]
pub struct Collector {
    pub resolution: Duration,
    pub roster: Roster,
    pub overlay_counting: OverlayCounting,
}

impl Default for Collector {
    fn default() -> Self {
        Collector {
            resolution: DEFAULT_RESOLUTION,
            roster: Roster::default(),
            overlay_counting: OverlayCounting::default(),
        }
    }
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: Duration) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_overlay_counting(mut self, mode: OverlayCounting) -> Self {
        self.overlay_counting = mode;
        self
    }

    /// Fold the records, in order, into a fresh `SummaryStats`.
    ///
    /// Totals do not depend on record order, but encounter spans do: each
    /// boss hit moves the span's end to that hit's bucket.
    pub fn run(&self, records: &[CombatLogRecord]) -> SummaryStats {
        let mut stats = SummaryStats::default();
        for record in records {
            self.handle_event(&mut stats, record);
        }
        tracing::debug!(
            records = records.len(),
            encounters = stats.encounters.len(),
            buckets = stats.damage_done_over_time.len(),
            "Collected summary stats"
        );
        stats
    }

    /// Truncate a timestamp to the start of its bucket
    pub fn bucket(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let step = self.resolution.as_millis() as i64;
        if step <= 0 {
            return timestamp;
        }
        let millis = timestamp.and_utc().timestamp_millis();
        let floored = millis - millis.rem_euclid(step);
        DateTime::<Utc>::from_timestamp_millis(floored)
            .map(|t| t.naive_utc())
            .unwrap_or(timestamp)
    }

    fn handle_event(&self, stats: &mut SummaryStats, record: &CombatLogRecord) {
        let header = &record.header;
        let roster = &self.roster;

        if is_damage_event(header.event_type) {
            let amount = record
                .extra_attacks()
                .map(|e| e.amount)
                .or_else(|| record.damage().map(|d| d.amount))
                .unwrap_or(0);
            let now = self.bucket(header.timestamp);

            if roster.is_boss_name(&header.target_name) {
                stats
                    .encounters
                    .entry(header.target_name.clone())
                    .and_modify(|span| span.end_time = now)
                    .or_insert(EncounterSpan {
                        start_time: now,
                        end_time: now,
                    });
            }

            let source_hostile =
                roster.is_boss_id(&header.source_id) || roster.is_npc_id(&header.source_id);
            let target_hostile =
                roster.is_npc_id(&header.target_id) || roster.is_boss_id(&header.target_id);

            if source_hostile && roster.is_player_id(&header.target_id) {
                // NPC -> player
                *stats
                    .damage_taken_by_source
                    .entry(header.source_name.clone())
                    .or_insert(0) += amount;
                *stats.damage_taken_over_time.entry(now).or_insert(0) += amount;
                if let Some(spell) = record.spell() {
                    *stats
                        .damage_taken_by_spell
                        .entry(spell.spell_name.clone())
                        .or_insert(0) += amount;
                }
            } else if roster.is_player_id(&header.source_id) && target_hostile {
                // player -> NPC
                *stats
                    .damage_by_source
                    .entry(header.source_name.clone())
                    .or_insert(0) += amount;
                *stats.damage_done_over_time.entry(now).or_insert(0) += amount;
            }
            return;
        }

        if is_healing_event(header.event_type) {
            if !roster.is_player_id(&header.source_id) {
                return;
            }
            let Some(heal) = record.heal() else {
                tracing::debug!(event = %header.event_type, "Healing event without heal suffix");
                return;
            };
            *stats
                .healing_by_source
                .entry(header.source_name.clone())
                .or_insert(0) += heal.amount;
            *stats
                .healing_done_over_time
                .entry(self.bucket(header.timestamp))
                .or_insert(0) += heal.amount;
            return;
        }

        if is_overlay_event(header.event_type) {
            let source = &header.source_name;
            match self.overlay_counting {
                OverlayCounting::Legacy => {
                    *stats.dispels_by_source.entry(source.clone()).or_insert(0) += 1;
                    *stats.interrupts_by_source.entry(source.clone()).or_insert(0) += 1;
                }
                OverlayCounting::ByEventType => match header.event_type {
                    EventType::SpellInterrupt => {
                        *stats.interrupts_by_source.entry(source.clone()).or_insert(0) += 1;
                    }
                    EventType::SpellDispel => {
                        *stats.dispels_by_source.entry(source.clone()).or_insert(0) += 1;
                    }
                    _ => {}
                },
            }
        }
    }
}
