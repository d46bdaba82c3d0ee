//! Shared deterministic types for the registry core.
//!
//! These types define the contracts between the validator, the update rules,
//! and the suspension logic. They hold no I/O handles and compare by value.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Demerit history keyed by offense date. Each date holds one point value.
pub type DemeritHistory = BTreeMap<NaiveDate, u8>;

/// The personal details a caller supplies at registration and may amend later.
///
/// Values are kept as the raw text read from the store so that rows written
/// under older rules still load and can be carried through unrelated updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetails {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// `street|city|postcode|state|country`.
    pub address: String,
    /// `DD-MM-YYYY`.
    pub birthdate: String,
}

/// A stored driver record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub details: PersonDetails,
    pub demerit_points: DemeritHistory,
    /// One-way flag; nothing in the core clears it.
    pub is_suspended: bool,
}

impl PersonRecord {
    /// A freshly registered record: no offenses, not suspended.
    pub fn new(details: PersonDetails) -> Self {
        Self {
            details,
            demerit_points: DemeritHistory::new(),
            is_suspended: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.details.id
    }
}

/// Replacement values for an update. `None` or an empty string keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
}

/// Fields a validation failure can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    FirstName,
    LastName,
    Address,
    Birthdate,
    OffenseDate,
    Points,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Address => "address",
            Field::Birthdate => "birthdate",
            Field::OffenseDate => "offense_date",
            Field::Points => "points",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cross-field constraints enforced on personal-detail updates, in the order
/// they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessRule {
    /// A subject under 18 cannot change address unless the birthdate is also
    /// being corrected.
    MinorAddressLock,
    /// A birthdate change must be the only change in the call.
    BirthdateExclusivity,
    /// An identifier starting with an even digit is frozen.
    EvenIdentifierLock,
}

impl BusinessRule {
    pub fn code(self) -> &'static str {
        match self {
            BusinessRule::MinorAddressLock => "minor_address_lock",
            BusinessRule::BirthdateExclusivity => "birthdate_exclusivity",
            BusinessRule::EvenIdentifierLock => "even_identifier_lock",
        }
    }
}

impl fmt::Display for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Expected refusal of an operation. Nothing was mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid {field}: {value:?}")]
    Invalid { field: Field, value: String },
    #[error("business rule violated: {0}")]
    Rule(BusinessRule),
}

impl Rejection {
    pub fn invalid(field: Field, value: impl Into<String>) -> Self {
        Rejection::Invalid {
            field,
            value: value.into(),
        }
    }

    /// Stable machine-readable reason, e.g. `invalid_address` or
    /// `even_identifier_lock`.
    pub fn reason_code(&self) -> String {
        match self {
            Rejection::Invalid { field, .. } => format!("invalid_{}", field.label()),
            Rejection::Rule(rule) => rule.code().to_string(),
        }
    }
}
