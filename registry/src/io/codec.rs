//! Line codec for the flat-file record store.
//!
//! One record per line, seven comma-separated fields:
//!
//! ```text
//! ID,First,Last,Address,Birthdate,History,Suspended
//! 23AB$%12XY,John,Smith,1|Melbourne|3000|Victoria|AU,15-03-1990,01-01-2026:3;01-02-2026:2,false
//! ```
//!
//! `History` is `0` when there are no offenses, otherwise `;`-separated
//! `DD-MM-YYYY:N` pairs in date order. Text fields are stored verbatim, so
//! only the field separator and line breaks are reserved in them.

use thiserror::Error;

use crate::core::dates::{format_date, parse_date};
use crate::core::types::{DemeritHistory, PersonDetails, PersonRecord};
use crate::core::validator::valid_points;

const FIELD_SEP: char = ',';
const ENTRY_SEP: char = ';';
const POINTS_SEP: char = ':';
const FIELD_COUNT: usize = 7;
const EMPTY_HISTORY: &str = "0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),
    #[error("{field} contains a reserved character: {value:?}")]
    ReservedChar { field: &'static str, value: String },
    #[error("malformed demerit entry {0:?}")]
    History(String),
    #[error("malformed suspended flag {0:?}")]
    Suspended(String),
}

/// Encode a record as a single line (no trailing newline).
pub fn encode(record: &PersonRecord) -> Result<String, CodecError> {
    let details = &record.details;
    let text_fields = [
        ("id", &details.id),
        ("first_name", &details.first_name),
        ("last_name", &details.last_name),
        ("address", &details.address),
        ("birthdate", &details.birthdate),
    ];
    for (field, value) in text_fields {
        if value
            .chars()
            .any(|c| c == FIELD_SEP || c == '\n' || c == '\r')
        {
            return Err(CodecError::ReservedChar {
                field,
                value: value.clone(),
            });
        }
    }

    Ok([
        details.id.as_str(),
        details.first_name.as_str(),
        details.last_name.as_str(),
        details.address.as_str(),
        details.birthdate.as_str(),
        encode_history(&record.demerit_points).as_str(),
        if record.is_suspended { "true" } else { "false" },
    ]
    .join(","))
}

/// Decode one line.
///
/// Text fields come back exactly as written. The history and suspended
/// fields tolerate surrounding whitespace.
pub fn decode(line: &str) -> Result<PersonRecord, CodecError> {
    let parts: Vec<&str> = line.split(FIELD_SEP).collect();
    if parts.len() != FIELD_COUNT {
        return Err(CodecError::FieldCount(parts.len()));
    }
    let demerit_points = decode_history(parts[5].trim())?;
    let is_suspended = match parts[6].trim() {
        "true" => true,
        "false" => false,
        other => return Err(CodecError::Suspended(other.to_string())),
    };
    Ok(PersonRecord {
        details: PersonDetails {
            id: parts[0].to_string(),
            first_name: parts[1].to_string(),
            last_name: parts[2].to_string(),
            address: parts[3].to_string(),
            birthdate: parts[4].to_string(),
        },
        demerit_points,
        is_suspended,
    })
}

/// The identifier field of a line, without decoding the rest.
pub fn line_id(line: &str) -> Option<&str> {
    line.split(FIELD_SEP).next()
}

fn encode_history(history: &DemeritHistory) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    history
        .iter()
        .map(|(date, points)| format!("{}{POINTS_SEP}{points}", format_date(*date)))
        .collect::<Vec<_>>()
        .join(&ENTRY_SEP.to_string())
}

fn decode_history(field: &str) -> Result<DemeritHistory, CodecError> {
    let mut history = DemeritHistory::new();
    if field.is_empty() || field == EMPTY_HISTORY {
        return Ok(history);
    }
    for entry in field.split(ENTRY_SEP) {
        let malformed = || CodecError::History(entry.to_string());
        let (date, points) = entry.split_once(POINTS_SEP).ok_or_else(malformed)?;
        let date = parse_date(date.trim()).ok_or_else(malformed)?;
        let points: u8 = points.trim().parse().map_err(|_| malformed())?;
        if !valid_points(i64::from(points)) {
            return Err(malformed());
        }
        history.insert(date, points);
    }
    Ok(history)
}
