use std::path::PathBuf;

use thiserror::Error;

/// Why a single line could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no double-space separator between timestamp and event data")]
    MissingSeparator,

    #[error("timestamp {0:?} does not match YEAR/M/D H:MM:SS.mmm")]
    Timestamp(String),

    #[error("field {index} is missing")]
    MissingField { index: usize },

    #[error("field {index} ({value:?}) is not a valid {expected}")]
    InvalidNumber {
        index: usize,
        value: String,
        expected: &'static str,
    },

    #[error("field {index} ({value:?}) is not a known {expected}")]
    UnknownToken {
        index: usize,
        value: String,
        expected: &'static str,
    },
}

/// A structural failure pinned to its line in the input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind} (in {raw:?})")]
pub struct LineError {
    /// 1-based
    pub line: usize,
    pub raw: String,
    #[source]
    pub kind: FieldError,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read combat log: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Line(#[from] LineError),
}

/// Errors that can occur while loading a roster file
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse roster {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
