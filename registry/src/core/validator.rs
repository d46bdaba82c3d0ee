//! Field predicates for driver records.
//!
//! Each predicate is total: it answers `false` for anything malformed and
//! never panics. `today` is always passed in so results are reproducible.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::core::dates::{parse_date, years_before};
use crate::core::types::{Field, PersonDetails, Rejection};

/// State every registered address must be in.
pub const REQUIRED_STATE: &str = "Victoria";
/// Oldest accepted birthdate, in years before today (exclusive).
pub const MAX_AGE_YEARS: u32 = 100;
pub const MIN_POINTS: i64 = 1;
pub const MAX_POINTS: i64 = 6;

const ID_LEN: usize = 10;
const ADDRESS_PARTS: usize = 5;
const STATE_INDEX: usize = 3;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} '\-]{1,50}$").unwrap());

/// Identifier rules:
/// - exactly 10 characters
/// - characters 1-2 are digits 2-9
/// - characters 3-8 include at least two that are neither letters nor digits
/// - characters 9-10 are uppercase `A-Z`
pub fn valid_identifier(id: &str) -> bool {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != ID_LEN {
        return false;
    }
    let prefix_ok = chars[..2].iter().all(|c| ('2'..='9').contains(c));
    let specials = chars[2..8].iter().filter(|c| !c.is_alphanumeric()).count();
    let suffix_ok = chars[8..].iter().all(char::is_ascii_uppercase);
    prefix_ok && specials >= 2 && suffix_ok
}

/// 1-50 characters drawn from letters (any script), space, hyphen, apostrophe.
pub fn valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Five `|`-separated parts with the state (fourth part) exactly `Victoria`.
///
/// Trailing empty parts are dropped before counting, so an address that ends
/// in `|` is one part short.
pub fn valid_address(address: &str) -> bool {
    let mut parts: Vec<&str> = address.split('|').collect();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts.len() == ADDRESS_PARTS && parts[STATE_INDEX] == REQUIRED_STATE
}

/// A real `DD-MM-YYYY` date, not after `today`, and less than 100 years old.
pub fn valid_birthdate(birthdate: &str, today: NaiveDate) -> bool {
    let Some(date) = parse_date(birthdate) else {
        return false;
    };
    let Some(oldest) = years_before(today, MAX_AGE_YEARS) else {
        return false;
    };
    date <= today && date > oldest
}

/// A real `DD-MM-YYYY` calendar date. Future dates are allowed here.
pub fn valid_offense_date(date: &str) -> bool {
    parse_date(date).is_some()
}

pub fn valid_points(points: i64) -> bool {
    (MIN_POINTS..=MAX_POINTS).contains(&points)
}

/// Apply the predicate that governs `field` to `value`.
pub fn check_field(field: Field, value: &str, today: NaiveDate) -> Result<(), Rejection> {
    let ok = match field {
        Field::Id => valid_identifier(value),
        Field::FirstName | Field::LastName => valid_name(value),
        Field::Address => valid_address(value),
        Field::Birthdate => valid_birthdate(value, today),
        Field::OffenseDate => valid_offense_date(value),
        Field::Points => value.parse::<i64>().is_ok_and(valid_points),
    };
    if ok {
        Ok(())
    } else {
        Err(Rejection::invalid(field, value))
    }
}

/// Validate every field of a registration candidate.
///
/// Fields are checked in record order and the first failure is returned.
pub fn check_details(details: &PersonDetails, today: NaiveDate) -> Result<(), Rejection> {
    check_field(Field::Id, &details.id, today)?;
    check_field(Field::FirstName, &details.first_name, today)?;
    check_field(Field::LastName, &details.last_name, today)?;
    check_field(Field::Address, &details.address, today)?;
    check_field(Field::Birthdate, &details.birthdate, today)
}
