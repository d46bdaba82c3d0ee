//! Demerit accumulation and licence suspension.

use chrono::NaiveDate;

use crate::core::dates::{age_on, parse_date, years_before};
use crate::core::types::{DemeritHistory, Field, PersonRecord, Rejection};
use crate::core::validator::valid_points;

/// Length of the rolling window, in years back from today.
pub const WINDOW_YEARS: u32 = 2;
/// Subjects younger than this use [`YOUNG_DRIVER_LIMIT`].
pub const YOUNG_DRIVER_AGE: u32 = 21;
pub const YOUNG_DRIVER_LIMIT: u32 = 6;
pub const FULL_LICENCE_LIMIT: u32 = 12;

/// Outcome of evaluating a history against the suspension thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    /// Sum of points dated within `[today - 2 years, today]`.
    pub total: u32,
    /// Largest total that does not suspend at this age.
    pub limit: u32,
    pub age: u32,
    pub exceeds_limit: bool,
}

/// Sum points for offenses in the inclusive window ending `today`.
///
/// Entries dated after `today` are on file but do not count yet.
pub fn rolling_total(history: &DemeritHistory, today: NaiveDate) -> u32 {
    let start = years_before(today, WINDOW_YEARS).unwrap_or(NaiveDate::MIN);
    history
        .range(start..=today)
        .map(|(_, points)| u32::from(*points))
        .sum()
}

/// The highest rolling total allowed before suspension at `age`.
pub fn points_limit(age: u32) -> u32 {
    if age < YOUNG_DRIVER_AGE {
        YOUNG_DRIVER_LIMIT
    } else {
        FULL_LICENCE_LIMIT
    }
}

pub fn assess(history: &DemeritHistory, birthdate: NaiveDate, today: NaiveDate) -> Assessment {
    let total = rolling_total(history, today);
    let age = age_on(birthdate, today);
    let limit = points_limit(age);
    Assessment {
        total,
        limit,
        age,
        exceeds_limit: total > limit,
    }
}

/// A demerit submission whose date and point value have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offense {
    pub date: NaiveDate,
    pub points: u8,
}

impl Offense {
    /// Check a raw submission: strict `DD-MM-YYYY` date, points in `1..=6`.
    pub fn parse(offense_date: &str, points: i64) -> Result<Self, Rejection> {
        let date = parse_date(offense_date)
            .ok_or_else(|| Rejection::invalid(Field::OffenseDate, offense_date))?;
        let points = u8::try_from(points)
            .ok()
            .filter(|value| valid_points(i64::from(*value)))
            .ok_or_else(|| Rejection::invalid(Field::Points, points.to_string()))?;
        Ok(Self { date, points })
    }
}

/// Record an offense on `record` and update its suspension flag.
///
/// The stored birthdate is checked before anything is written, so a rejection
/// leaves the record exactly as it was. An offense on a date already on file
/// replaces the earlier point value.
pub fn record_offense(
    record: &mut PersonRecord,
    offense: Offense,
    today: NaiveDate,
) -> Result<Assessment, Rejection> {
    let birthdate = parse_date(&record.details.birthdate)
        .ok_or_else(|| Rejection::invalid(Field::Birthdate, record.details.birthdate.clone()))?;

    record.demerit_points.insert(offense.date, offense.points);
    let assessment = assess(&record.demerit_points, birthdate, today);
    if assessment.exceeds_limit {
        record.is_suspended = true;
    }
    Ok(assessment)
}
