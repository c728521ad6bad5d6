use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Datelike;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{FieldError, LineError, ParseError};
use crate::grammar;
use crate::layout::{layout_for, PREFIX_OFFSET};
use crate::listener::EventListener;
use crate::models::*;

/// What the parser does with a line that breaks the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first malformed line and return no records
    #[default]
    Abort,
    /// Log and record the failure, then keep going
    Skip,
}

/// A line carrying an event tag this parser has no layout for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub event_tag: String,
}

/// Output of a whole-input parse, in line order
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub records: Vec<CombatLogRecord>,
    pub diagnostics: Vec<Diagnostic>,
    /// Only populated under `ErrorPolicy::Skip`
    pub rejected: Vec<LineError>,
}

/// Reads combat log lines into records, running any registered hooks as
/// each record is accepted.
pub struct Parser {
    reference_year: i32,
    policy: ErrorPolicy,
    listener: EventListener,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(chrono::Local::now().year())
    }
}

impl Parser {
    pub fn new(reference_year: i32) -> Self {
        Parser {
            reference_year,
            policy: ErrorPolicy::default(),
            listener: EventListener::new(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_listener(mut self, listener: EventListener) -> Self {
        self.listener = listener;
        self
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn listener_mut(&mut self) -> &mut EventListener {
        &mut self.listener
    }

    /// Parse a combat log file from disk
    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedLog, ParseError> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(1024 * 1024, file); // 1MB buffer
        self.parse_reader(reader)
    }

    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<ParsedLog, ParseError> {
        let mut log = ParsedLog::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            self.accept(idx + 1, &line, &mut log)?;
        }
        self.report(&log);
        Ok(log)
    }

    pub fn parse_lines<'a, I>(&mut self, lines: I) -> Result<ParsedLog, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut log = ParsedLog::default();
        for (idx, line) in lines.into_iter().enumerate() {
            self.accept(idx + 1, line, &mut log)?;
        }
        self.report(&log);
        Ok(log)
    }

    /// Parse every line on the rayon pool, then accept the results in line
    /// order. Hooks, diagnostics and the error policy behave exactly as in
    /// `parse_lines`.
    pub fn parse_str_parallel(&mut self, input: &str) -> Result<ParsedLog, ParseError> {
        let year = self.reference_year;
        let lines: Vec<&str> = input.lines().collect();
        let parsed: Vec<Option<Result<CombatLogRecord, FieldError>>> = lines
            .par_iter()
            .map(|line| (!is_blank(line)).then(|| parse_line(line, year)))
            .collect();

        let mut log = ParsedLog::default();
        for (idx, (line, result)) in lines.iter().zip(parsed).enumerate() {
            if let Some(result) = result {
                self.commit(idx + 1, line, result, &mut log)?;
            }
        }
        self.report(&log);
        Ok(log)
    }

    fn accept(&mut self, line_number: usize, line: &str, log: &mut ParsedLog) -> Result<(), LineError> {
        if is_blank(line) {
            return Ok(());
        }
        let result = parse_line(line, self.reference_year);
        self.commit(line_number, line, result, log)
    }

    fn commit(
        &mut self,
        line_number: usize,
        line: &str,
        result: Result<CombatLogRecord, FieldError>,
        log: &mut ParsedLog,
    ) -> Result<(), LineError> {
        match result {
            Ok(record) => {
                if record.header.event_type == EventType::Unknown {
                    let event_tag = event_tag(line).to_string();
                    tracing::warn!(line = line_number, event = %event_tag, "Unknown event type");
                    log.diagnostics.push(Diagnostic {
                        line: line_number,
                        event_tag,
                    });
                }
                self.listener.dispatch(&record);
                log.records.push(record);
                Ok(())
            }
            Err(kind) => {
                let err = LineError {
                    line: line_number,
                    raw: line.to_string(),
                    kind,
                };
                match self.policy {
                    ErrorPolicy::Abort => Err(err),
                    ErrorPolicy::Skip => {
                        tracing::warn!(error = %err, "Skipping malformed line");
                        log.rejected.push(err);
                        Ok(())
                    }
                }
            }
        }
    }

    fn report(&self, log: &ParsedLog) {
        tracing::debug!(
            records = log.records.len(),
            unknown = log.diagnostics.len(),
            rejected = log.rejected.len(),
            "Parsed combat log"
        );
    }
}

/// Parse one combat log line. `year` fills in the year the log omits.
pub fn parse_line(line: &str, year: i32) -> Result<CombatLogRecord, FieldError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (timestamp_str, event_str) =
        split_timestamp_event(line).ok_or(FieldError::MissingSeparator)?;
    let timestamp = grammar::parse_timestamp(timestamp_str, year)?;

    let fields = Fields::new(parse_csv_fields(event_str));
    let event_type = EventType::from_tag(fields.text(0)?);
    // Fields 3 and 6 are unit flags, not consumed
    let header = Header {
        timestamp,
        event_type,
        source_id: fields.text(1)?.to_string(),
        source_name: fields.name(2)?,
        target_id: fields.text(4)?.to_string(),
        target_name: fields.name(5)?,
    };

    let (prefix, suffix) = match layout_for(event_type) {
        Some(layout) => (
            parse_prefix(layout.prefix, &fields, PREFIX_OFFSET)?,
            parse_suffix(layout.suffix, &fields, layout.suffix_offset)?,
        ),
        None => (Prefix::None, Suffix::None),
    };

    Ok(CombatLogRecord {
        header,
        prefix,
        suffix,
    })
}

fn parse_prefix(kind: PrefixKind, fields: &Fields, at: usize) -> Result<Prefix, FieldError> {
    Ok(match kind {
        PrefixKind::None => Prefix::None,
        PrefixKind::Spell => Prefix::Spell(SpellPrefix {
            spell_id: fields.unsigned(at)?,
            spell_name: fields.name(at + 1)?,
            spell_school: fields.school(at + 2)?,
        }),
        PrefixKind::Enchant => Prefix::Enchant(EnchantPrefix {
            spell_name: fields.name(at)?,
            item_id: fields.unsigned(at + 1)?,
            item_name: fields.name(at + 2)?,
        }),
        PrefixKind::Environmental => Prefix::Environmental(EnvironmentalPrefix {
            environmental_type: fields.environmental_type(at)?,
        }),
    })
}

fn parse_suffix(kind: SuffixKind, fields: &Fields, at: usize) -> Result<Suffix, FieldError> {
    Ok(match kind {
        SuffixKind::None => Suffix::None,
        SuffixKind::Damage => Suffix::Damage(DamageSuffix {
            amount: fields.unsigned(at)?,
            overkill: fields.signed(at + 1)?,
            spell_school: fields.school(at + 2)?,
            resisted: fields.unsigned_or_nil(at + 3)?,
            blocked: fields.unsigned_or_nil(at + 4)?,
            absorbed: fields.unsigned_or_nil(at + 5)?,
            critical: fields.flag(at + 6)?,
        }),
        SuffixKind::Heal => Suffix::Heal(HealSuffix {
            amount: fields.unsigned(at)?,
            overhealing: fields.unsigned(at + 1)?,
            absorbed: fields.unsigned_or_nil(at + 2)?,
            critical: fields.flag(at + 3)?,
        }),
        SuffixKind::Miss => Suffix::Miss(MissSuffix {
            miss_type: fields.name(at)?,
        }),
        SuffixKind::Aura => Suffix::Aura(AuraSuffix {
            aura_type: fields.aura_type(at)?,
        }),
        SuffixKind::Energize => Suffix::Energize(EnergizeSuffix {
            amount: fields.signed(at)?,
            power_type: PowerType(fields.signed(at + 1)?),
        }),
        SuffixKind::Interrupt => Suffix::Interrupt(InterruptSuffix {
            extra_spell_id: fields.unsigned(at)?,
            extra_spell_name: fields.name(at + 1)?,
            extra_spell_school: fields.school(at + 2)?,
        }),
        SuffixKind::ExtraAttacks => Suffix::ExtraAttacks(ExtraAttacksSuffix {
            amount: fields.unsigned(at)?,
        }),
        SuffixKind::DispelOrSteal => Suffix::DispelOrSteal(DispelOrStealSuffix {
            extra_spell_id: fields.unsigned(at)?,
            extra_spell_name: fields.name(at + 1)?,
            extra_spell_school: fields.school(at + 2)?,
            aura_type: fields.aura_type(at + 3)?,
        }),
        SuffixKind::LeechOrDrain => Suffix::LeechOrDrain(LeechOrDrainSuffix {
            amount: fields.unsigned(at)?,
            power_type: PowerType(fields.signed(at + 1)?),
            extra_amount: fields.unsigned(at + 2)?,
        }),
    })
}

/// Positional access to the comma-separated event fields, typed per grammar
struct Fields<'a> {
    values: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(values: Vec<&'a str>) -> Self {
        Fields { values }
    }

    fn text(&self, index: usize) -> Result<&'a str, FieldError> {
        self.values
            .get(index)
            .copied()
            .ok_or(FieldError::MissingField { index })
    }

    fn name(&self, index: usize) -> Result<String, FieldError> {
        self.text(index).map(unquote)
    }

    fn number<T>(
        &self,
        index: usize,
        expected: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, FieldError> {
        let value = self.text(index)?;
        parse(value).ok_or_else(|| FieldError::InvalidNumber {
            index,
            value: value.to_string(),
            expected,
        })
    }

    fn unsigned(&self, index: usize) -> Result<u64, FieldError> {
        self.number(index, "unsigned integer", grammar::unsigned)
    }

    fn signed(&self, index: usize) -> Result<i64, FieldError> {
        self.number(index, "signed integer", grammar::signed)
    }

    fn unsigned_or_nil(&self, index: usize) -> Result<u64, FieldError> {
        self.number(index, "unsigned integer or nil", grammar::unsigned_or_nil)
    }

    fn school(&self, index: usize) -> Result<SpellSchool, FieldError> {
        self.number(index, "spell school", grammar::school_mask)
            .map(SpellSchool)
    }

    fn flag(&self, index: usize) -> Result<bool, FieldError> {
        self.text(index).map(grammar::flag)
    }

    fn aura_type(&self, index: usize) -> Result<AuraType, FieldError> {
        let value = self.name(index)?;
        AuraType::from_token(&value).ok_or(FieldError::UnknownToken {
            index,
            value,
            expected: "aura type",
        })
    }

    fn environmental_type(&self, index: usize) -> Result<EnvironmentalType, FieldError> {
        let value = self.name(index)?;
        EnvironmentalType::from_token(&value).ok_or(FieldError::UnknownToken {
            index,
            value,
            expected: "environmental type",
        })
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Raw event tag of a line, for diagnostics
fn event_tag(line: &str) -> &str {
    split_timestamp_event(line)
        .and_then(|(_, event)| event.split(',').next())
        .unwrap_or("")
}

/// Split a log line into timestamp and event parts
fn split_timestamp_event(line: &str) -> Option<(&str, &str)> {
    let pos = line.find("  ")?;
    Some((&line[..pos], &line[pos + 2..]))
}

/// Parse CSV fields, respecting quoted strings
fn parse_csv_fields(input: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        while i < len && bytes[i] == b' ' {
            i += 1;
        }
        if i >= len {
            break;
        }

        let start = i;
        if bytes[i] == b'"' {
            i += 1;
            while i < len && bytes[i] != b'"' {
                i += 1;
            }
            if i < len {
                i += 1;
            }
        } else {
            while i < len && bytes[i] != b',' {
                i += 1;
            }
        }
        fields.push(&input[start..i]);
        if i < len && bytes[i] == b',' {
            i += 1;
            // A trailing comma still opens an (empty) field
            if i == len {
                fields.push("");
            }
        }
    }

    fields
}

/// Remove quotes from a string
fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}
