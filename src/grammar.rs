//! Token grammars for the combat log: the timestamp prefix and the numeric
//! field forms. Every parser here must consume its whole input.

use chrono::{NaiveDate, NaiveDateTime};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{char, hex_digit1, i64 as dec_i64, u32 as dec_u32, u64 as dec_u64},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::FieldError;

/// Token marking a field that does not apply to this event
const NIL_SENTINEL: &str = "nil";

fn digits<'a>(min: usize, max: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u32> {
    map_res(
        take_while_m_n(min, max, |c: char| c.is_ascii_digit()),
        str::parse::<u32>,
    )
}

/// `M/D H:MM:SS.mmm`, with the day optionally space-padded
fn clock(input: &str) -> IResult<&str, (u32, u32, u32, u32, u32, u32)> {
    tuple((
        digits(1, 2),
        preceded(tuple((char('/'), opt(char(' ')))), digits(1, 2)),
        preceded(char(' '), digits(1, 2)),
        preceded(char(':'), digits(2, 2)),
        preceded(char(':'), digits(2, 2)),
        preceded(char('.'), digits(3, 3)),
    ))(input)
}

/// Parse the timestamp segment of a line. The log omits the year, so the
/// caller supplies it and the result reads as `YEAR/M/D H:MM:SS.mmm`.
pub fn parse_timestamp(segment: &str, year: i32) -> Result<NaiveDateTime, FieldError> {
    let invalid = || FieldError::Timestamp(format!("{}/{}", year, segment));

    let (_, (month, day, hour, minute, second, millis)) =
        all_consuming(clock)(segment).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millis))
        .ok_or_else(invalid)
}

pub fn is_nil(token: &str) -> bool {
    token.contains(NIL_SENTINEL)
}

fn decimal_u64(input: &str) -> IResult<&str, u64> {
    dec_u64(input)
}

fn decimal_i64(input: &str) -> IResult<&str, i64> {
    dec_i64(input)
}

fn decimal_u32(input: &str) -> IResult<&str, u32> {
    dec_u32(input)
}

pub fn unsigned(token: &str) -> Option<u64> {
    all_consuming(decimal_u64)(token).ok().map(|(_, v)| v)
}

pub fn signed(token: &str) -> Option<i64> {
    all_consuming(decimal_i64)(token).ok().map(|(_, v)| v)
}

/// Unsigned value where `nil` means zero
pub fn unsigned_or_nil(token: &str) -> Option<u64> {
    if is_nil(token) {
        return Some(0);
    }
    unsigned(token)
}

fn hex_u32(input: &str) -> IResult<&str, u32> {
    map_res(preceded(alt((tag("0x"), tag("0X"))), hex_digit1), |h: &str| {
        u32::from_str_radix(h, 16)
    })(input)
}

/// School or mask field, written either as `0x`-prefixed hex or as decimal
pub fn school_mask(token: &str) -> Option<u32> {
    all_consuming(alt((hex_u32, decimal_u32)))(token)
        .ok()
        .map(|(_, v)| v)
}

/// Boolean flag. `nil` and anything unrecognised read as false.
pub fn flag(token: &str) -> bool {
    if is_nil(token) {
        return false;
    }
    matches!(token, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("1/20 21:15:42.123", 2024).unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 20);
        assert_eq!(ts.hour(), 21);
        assert_eq!(ts.minute(), 15);
        assert_eq!(ts.second(), 42);
        assert_eq!(ts.and_utc().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_parse_timestamp_padded_day() {
        let padded = parse_timestamp("3/ 5 9:04:05.000", 2023).unwrap();
        let plain = parse_timestamp("3/5 9:04:05.000", 2023).unwrap();
        assert_eq!(padded, plain);
        assert_eq!(padded.day(), 5);
        assert_eq!(padded.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_rejects_bad_formats() {
        for bad in [
            "",
            "1/20 21:15:42",
            "1/20 21:15:42.12",
            "1/20 21:15:42.1234",
            "1/20 21:5:42.123",
            "13/20 21:15:42.123",
            "2/30 21:15:42.123",
            "1/20 25:15:42.123",
            "1-20 21:15:42.123",
            "garbage",
        ] {
            assert!(
                matches!(parse_timestamp(bad, 2024), Err(FieldError::Timestamp(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(unsigned("1161"), Some(1161));
        assert_eq!(unsigned("-1"), None);
        assert_eq!(unsigned("12a"), None);
        assert_eq!(signed("-1"), Some(-1));
        assert_eq!(signed("250"), Some(250));
        assert_eq!(signed(""), None);
    }

    #[test]
    fn test_nil_sentinel() {
        assert_eq!(unsigned_or_nil("nil"), Some(0));
        assert_eq!(unsigned_or_nil("42"), Some(42));
        assert_eq!(unsigned_or_nil("oops"), None);
        assert!(!flag("nil"));
        assert!(flag("1"));
        assert!(!flag("0"));
    }

    #[test]
    fn test_school_mask_hex_and_decimal_agree() {
        assert_eq!(school_mask("0x10"), Some(16));
        assert_eq!(school_mask("16"), Some(16));
        assert_eq!(school_mask("0x7f"), Some(127));
        assert_eq!(school_mask("0x"), None);
        assert_eq!(school_mask("0xZZ"), None);
    }
}
