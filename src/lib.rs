//! Parse World of Warcraft combat logs into typed records and aggregate
//! them into raid metrics.

pub mod classify;
pub mod config;
pub mod error;
pub mod grammar;
pub mod layout;
pub mod listener;
pub mod models;
pub mod parser;
pub mod summary;

pub use error::{FieldError, LineError, ParseError, RosterError};
pub use listener::EventListener;
pub use models::{CombatLogRecord, EventType, SummaryStats};
pub use parser::{parse_line, ErrorPolicy, ParsedLog, Parser};
pub use summary::{Collector, OverlayCounting};
