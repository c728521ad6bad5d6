use std::path::PathBuf;
use std::time::Duration;

use clap::Parser as ClapParser;

use crate::classify::Roster;
use crate::error::RosterError;
use crate::parser::{ErrorPolicy, Parser};
use crate::summary::{Collector, OverlayCounting};

/// Summarize a World of Warcraft combat log as JSON
#[derive(Debug, Clone, ClapParser)]
#[command(name = "raidlog", version, about)]
pub struct Cli {
    /// Combat log file to parse
    #[arg(env = "RAIDLOG_LOG_FILE")]
    pub log_file: PathBuf,

    /// Year the log was written in (the log itself omits it). Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Width of over-time buckets, in seconds
    #[arg(long, default_value_t = 30)]
    pub resolution_secs: u64,

    /// TOML file overriding boss names and actor id prefixes
    #[arg(long, env = "RAIDLOG_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Skip malformed lines instead of aborting
    #[arg(long)]
    pub skip_malformed: bool,

    /// Count every aura, dispel, interrupt and death as both an interrupt and a dispel
    #[arg(long)]
    pub legacy_overlay_counting: bool,

    /// Parse lines on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Print the parsed records instead of the summary
    #[arg(long)]
    pub records: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    pub fn parser(&self) -> Parser {
        let parser = match self.year {
            Some(year) => Parser::new(year),
            None => Parser::default(),
        };
        let policy = if self.skip_malformed {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        };
        parser.with_policy(policy)
    }

    pub fn collector(&self) -> Result<Collector, RosterError> {
        let roster = match &self.roster {
            Some(path) => Roster::load(path)?,
            None => Roster::default(),
        };
        let overlay_counting = if self.legacy_overlay_counting {
            OverlayCounting::Legacy
        } else {
            OverlayCounting::ByEventType
        };
        Ok(Collector::new()
            .with_resolution(Duration::from_secs(self.resolution_secs))
            .with_roster(roster)
            .with_overlay_counting(overlay_counting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["raidlog", "WoWCombatLog.txt"]).unwrap();
        assert_eq!(cli.log_file, PathBuf::from("WoWCombatLog.txt"));
        assert_eq!(cli.resolution_secs, 30);
        assert!(!cli.skip_malformed);

        let collector = cli.collector().unwrap();
        assert_eq!(collector.resolution, Duration::from_secs(30));
        assert_eq!(collector.overlay_counting, OverlayCounting::ByEventType);
        assert_eq!(collector.roster, Roster::default());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "raidlog",
            "log.txt",
            "--year",
            "2010",
            "--resolution-secs",
            "5",
            "--legacy-overlay-counting",
            "--skip-malformed",
        ])
        .unwrap();

        assert_eq!(cli.parser().reference_year(), 2010);
        let collector = cli.collector().unwrap();
        assert_eq!(collector.resolution, Duration::from_secs(5));
        assert_eq!(collector.overlay_counting, OverlayCounting::Legacy);
    }

    #[test]
    fn test_missing_roster_file_is_an_error() {
        let cli = Cli::try_parse_from(["raidlog", "log.txt", "--roster", "/nonexistent/roster.toml"])
            .unwrap();
        assert!(cli.collector().is_err());
    }
}
