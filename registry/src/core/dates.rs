//! Calendar helpers for the `DD-MM-YYYY` text form used throughout the registry.
//!
//! Every date that enters the core goes through [`parse_date`], which never
//! panics: malformed text, impossible calendar days, and out-of-range years
//! all come back as `None`.

use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;

/// Text layout for dates stored and accepted by the registry.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}-[0-9]{2}-[0-9]{4}$").unwrap());

/// Parse a strict `DD-MM-YYYY` date.
///
/// Rejects single-digit days or months, other separators, and days that do not
/// exist on the calendar (e.g. `31-02-2024`). The parsed value is formatted
/// back and compared with the input, so nothing lenient slips through.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE.is_match(text) {
        return None;
    }
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    (format_date(date) == text).then_some(date)
}

/// Render a date in `DD-MM-YYYY` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whole years elapsed between `birthdate` and `today`.
///
/// A birthday counts only once its month and day have been reached, so a
/// 29 February birthday rolls over on 1 March in non-leap years. Returns 0 for
/// dates after `today`.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    if birthdate > today {
        return 0;
    }
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// `date` shifted back by whole calendar years, clamped to month end.
///
/// Returns `None` when the result falls outside chrono's supported range.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}
