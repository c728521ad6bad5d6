use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use raidlog::classify::Roster;
use raidlog::models::EncounterSpan;
use raidlog::{Collector, ErrorPolicy, EventListener, EventType, OverlayCounting, ParseError, Parser};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn at(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[test]
fn test_three_line_scenario() {
    let lines = [
        "1/20 21:15:42.123  SWING_DAMAGE,0x0700000000000001,\"Alpha\",0x514,0xF150008F46000001,\"Lord Marrowgar\",0xa48,500,0,1,0,0,0,nil,nil,nil",
        "1/20 21:15:42.123  SPELL_HEAL,0x0700000000000002,\"Bravo\",0x514,0x0700000000000003,\"Charlie\",0x514,48071,\"Flash Heal\",0x2,300,0,0,nil",
        "1/20 21:15:42.123  SPELL_AURA_APPLIED,0x0700000000000001,\"Alpha\",0x514,0x0700000000000001,\"Alpha\",0x514,57623,\"Horn of Winter\",0x1,BUFF",
    ];
    let log = Parser::new(2024).parse_lines(lines).unwrap();
    assert_eq!(log.records.len(), 3);

    let bucket = at(2024, 1, 20, 21, 15, 30);
    let stats = Collector::new()
        .with_overlay_counting(OverlayCounting::Legacy)
        .run(&log.records);

    assert_eq!(stats.damage_by_source["Alpha"], 500);
    assert_eq!(stats.damage_done_over_time[&bucket], 500);
    assert_eq!(
        stats.encounters["Lord Marrowgar"],
        EncounterSpan {
            start_time: bucket,
            end_time: bucket,
        }
    );
    assert_eq!(stats.healing_by_source["Bravo"], 300);
    assert_eq!(stats.interrupts_by_source["Alpha"], 1);
    assert_eq!(stats.dispels_by_source["Alpha"], 1);

    // Auras are neither interrupts nor dispels unless legacy counting is on
    let stats = Collector::new().run(&log.records);
    assert!(stats.interrupts_by_source.is_empty());
    assert!(stats.dispels_by_source.is_empty());
}

#[test]
fn test_sample_log_summary() {
    let log = Parser::new(2010)
        .parse_file(&data("icc_marrowgar.log"))
        .unwrap();
    assert_eq!(log.records.len(), 15);
    assert_eq!(log.diagnostics.len(), 1);
    assert_eq!(log.diagnostics[0].line, 13);
    assert_eq!(log.diagnostics[0].event_tag, "SPELL_ABSORBED");
    assert!(log.rejected.is_empty());

    let stats = Collector::new().run(&log.records);

    assert_eq!(stats.damage_by_source["Arthas"], 7530);
    assert_eq!(stats.damage_by_source["Jaina"], 2500);
    assert_eq!(stats.damage_done_over_time[&at(2010, 12, 14, 20, 1, 0)], 5730);
    assert_eq!(stats.damage_done_over_time[&at(2010, 12, 14, 20, 1, 30)], 2500);
    assert_eq!(stats.damage_done_over_time[&at(2010, 12, 14, 20, 2, 0)], 1800);

    assert_eq!(stats.damage_taken_by_source["Lord Marrowgar"], 15000);
    assert_eq!(stats.damage_taken_by_spell["Coldflame"], 6000);
    assert_eq!(stats.damage_taken_by_spell.len(), 1);
    assert_eq!(stats.damage_taken_over_time[&at(2010, 12, 14, 20, 1, 0)], 15000);

    assert_eq!(stats.healing_by_source["Uther"], 12500);
    assert_eq!(stats.healing_done_over_time[&at(2010, 12, 14, 20, 1, 0)], 12500);

    assert_eq!(stats.interrupts_by_source["Jaina"], 1);
    assert_eq!(stats.interrupts_by_source.len(), 1);
    assert_eq!(stats.dispels_by_source["Uther"], 1);
    assert_eq!(stats.dispels_by_source.len(), 1);

    assert_eq!(
        stats.encounters["Lord Marrowgar"],
        EncounterSpan {
            start_time: at(2010, 12, 14, 20, 1, 0),
            end_time: at(2010, 12, 14, 20, 2, 0),
        }
    );
}

#[test]
fn test_sample_log_with_custom_roster() {
    let log = Parser::new(2010)
        .parse_file(&data("icc_marrowgar.log"))
        .unwrap();
    let roster = Roster::load(data("roster.toml")).unwrap();
    let stats = Collector::new().with_roster(roster).run(&log.records);

    assert_eq!(stats.encounters.len(), 1);
    let span = stats.encounters["Cult Adherent"];
    assert_eq!(span.start_time, at(2010, 12, 14, 20, 1, 30));
    assert_eq!(span.end_time, span.start_time);
    // Id prefixes fall back to the defaults
    assert_eq!(stats.damage_by_source["Arthas"], 7530);
}

#[test]
fn test_parallel_parse_of_sample_log() {
    let input = std::fs::read_to_string(data("icc_marrowgar.log")).unwrap();
    let parallel = Parser::new(2010).parse_str_parallel(&input).unwrap();
    let sequential = Parser::new(2010).parse_file(&data("icc_marrowgar.log")).unwrap();
    assert_eq!(sequential.records, parallel.records);
}

#[test]
fn test_hooks_fire_per_event_type() {
    let deaths = Arc::new(Mutex::new(Vec::new()));
    let mut listener = EventListener::new();
    let sink = deaths.clone();
    listener.add_event_listener(EventType::UnitDied, move |record| {
        sink.lock().unwrap().push(record.header.target_name.clone());
    });

    Parser::new(2010)
        .with_listener(listener)
        .parse_file(&data("icc_marrowgar.log"))
        .unwrap();
    assert_eq!(*deaths.lock().unwrap(), vec!["Lord Marrowgar".to_string()]);
}

#[test]
fn test_malformed_number_policies() {
    let lines = [
        "1/20 21:15:40.000  UNIT_DIED,0x0000000000000000,nil,0x80000000,0xF130008F14000A2B,\"Ghoul\",0xa48",
        "1/20 21:15:41.000  SWING_DAMAGE,0x0700000000000001,\"Alpha\",0x514,0xF130008F14000A2B,\"Ghoul\",0xa48,five,0,1,0,0,0,nil,nil,nil",
        "1/20 21:15:42.000  SWING_DAMAGE,0x0700000000000001,\"Alpha\",0x514,0xF130008F14000A2B,\"Ghoul\",0xa48,5,0,1,0,0,0,nil,nil,nil",
    ];

    match Parser::new(2024).parse_lines(lines) {
        Err(ParseError::Line(e)) => {
            assert_eq!(e.line, 2);
            assert_eq!(e.raw, lines[1]);
        }
        other => panic!("expected a line error, got {other:?}"),
    }

    let log = Parser::new(2024)
        .with_policy(ErrorPolicy::Skip)
        .parse_lines(lines)
        .unwrap();
    assert_eq!(log.records.len(), 2);
    assert_eq!(log.rejected.len(), 1);
    assert_eq!(log.rejected[0].line, 2);

    let stats = Collector::new().run(&log.records);
    assert_eq!(stats.damage_by_source["Alpha"], 5);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Parser::new(2024)
        .parse_file(Path::new("/nonexistent/WoWCombatLog.txt"))
        .unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
}
