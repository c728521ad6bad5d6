use std::io::Write;
use std::process::ExitCode;

use clap::Parser as _;
use tracing_subscriber::filter::EnvFilter;

use raidlog::config::Cli;
use raidlog::ParsedLog;

/// Initialize logging, writing to RAIDLOG_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("RAIDLOG_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    // 1. Build the collector first so a bad roster fails before a long parse
    let collector = match cli.collector() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load roster");
            return ExitCode::FAILURE;
        }
    };

    // 2. Parse the log into records
    let mut parser = cli.parser();
    let parsed: Result<ParsedLog, raidlog::ParseError> = if cli.parallel {
        std::fs::read_to_string(&cli.log_file)
            .map_err(raidlog::ParseError::from)
            .and_then(|input| parser.parse_str_parallel(&input))
    } else {
        parser.parse_file(&cli.log_file)
    };
    let log = match parsed {
        Ok(log) => log,
        Err(e) => {
            tracing::error!(file = %cli.log_file.display(), error = %e, "Failed to parse combat log");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        file = %cli.log_file.display(),
        records = log.records.len(),
        unknown = log.diagnostics.len(),
        skipped = log.rejected.len(),
        "Parsed combat log"
    );

    // 3. Aggregate and print
    let output = if cli.records {
        to_json(&log.records, cli.pretty)
    } else {
        to_json(&collector.run(&log.records), cli.pretty)
    };
    let json = match output {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", json) {
        tracing::error!(error = %e, "Failed to write output");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
