//! Personal-detail update rules.
//!
//! Merges an [`UpdateRequest`] into the current details, validates only the
//! fields that actually change, then applies the cross-field business rules.
//! The result is the complete replacement details or a [`Rejection`]; the
//! caller's record is never touched here.

use chrono::NaiveDate;

use crate::core::dates::{age_on, parse_date};
use crate::core::types::{BusinessRule, Field, PersonDetails, Rejection, UpdateRequest};
use crate::core::validator::check_field;

/// Below this age a subject's address is locked.
pub const ADULT_AGE: u32 = 18;

/// Which fields differ between the current and proposed details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub id: bool,
    pub first_name: bool,
    pub last_name: bool,
    pub address: bool,
    pub birthdate: bool,
}

impl ChangeSet {
    pub fn between(current: &PersonDetails, proposed: &PersonDetails) -> Self {
        Self {
            id: current.id != proposed.id,
            first_name: current.first_name != proposed.first_name,
            last_name: current.last_name != proposed.last_name,
            address: current.address != proposed.address,
            birthdate: current.birthdate != proposed.birthdate,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Any change besides the birthdate.
    fn touches_identity(&self) -> bool {
        self.id || self.first_name || self.last_name || self.address
    }
}

/// Proposed details: each supplied, non-empty value replaces the current one.
pub fn merge_request(current: &PersonDetails, request: &UpdateRequest) -> PersonDetails {
    fn pick(current: &str, proposed: Option<&String>) -> String {
        match proposed {
            Some(value) if !value.is_empty() => value.clone(),
            _ => current.to_string(),
        }
    }
    PersonDetails {
        id: pick(&current.id, request.id.as_ref()),
        first_name: pick(&current.first_name, request.first_name.as_ref()),
        last_name: pick(&current.last_name, request.last_name.as_ref()),
        address: pick(&current.address, request.address.as_ref()),
        birthdate: pick(&current.birthdate, request.birthdate.as_ref()),
    }
}

/// Compute the details that should replace `current`.
///
/// Order of checks:
/// 1. each changed field against its predicate (id, names, address, birthdate)
/// 2. [`BusinessRule::MinorAddressLock`], using the pre-update birthdate
/// 3. [`BusinessRule::BirthdateExclusivity`]
/// 4. [`BusinessRule::EvenIdentifierLock`], using the current identifier
pub fn plan_update(
    current: &PersonDetails,
    request: &UpdateRequest,
    today: NaiveDate,
) -> Result<PersonDetails, Rejection> {
    let proposed = merge_request(current, request);
    let changes = ChangeSet::between(current, &proposed);

    let changed_fields = [
        (changes.id, Field::Id, &proposed.id),
        (changes.first_name, Field::FirstName, &proposed.first_name),
        (changes.last_name, Field::LastName, &proposed.last_name),
        (changes.address, Field::Address, &proposed.address),
        (changes.birthdate, Field::Birthdate, &proposed.birthdate),
    ];
    for (changed, field, value) in changed_fields {
        if changed {
            check_field(field, value, today)?;
        }
    }

    if !changes.birthdate && changes.address && is_minor(&current.birthdate, today)? {
        return Err(Rejection::Rule(BusinessRule::MinorAddressLock));
    }
    if changes.birthdate && changes.touches_identity() {
        return Err(Rejection::Rule(BusinessRule::BirthdateExclusivity));
    }
    if changes.id && starts_with_even_digit(&current.id) {
        return Err(Rejection::Rule(BusinessRule::EvenIdentifierLock));
    }

    Ok(proposed)
}

/// True if the first character is one of `0 2 4 6 8`.
pub fn starts_with_even_digit(id: &str) -> bool {
    id.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .is_some_and(|digit| digit % 2 == 0)
}

/// The stored birthdate is only parsed when the minor lock needs it, so a
/// legacy row with a bad birthdate can still have its name corrected.
fn is_minor(birthdate: &str, today: NaiveDate) -> Result<bool, Rejection> {
    let born =
        parse_date(birthdate).ok_or_else(|| Rejection::invalid(Field::Birthdate, birthdate))?;
    Ok(age_on(born, today) < ADULT_AGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{adult_details, date, minor_details};

    const NEW_ADDRESS: &str = "999 New St|Melbourne|3003|Victoria|AU";

    fn today() -> NaiveDate {
        date("16-10-2026")
    }

    #[test]
    fn empty_request_keeps_everything() {
        let current = adult_details("23AB$%12XY");
        let planned = plan_update(&current, &UpdateRequest::default(), today()).expect("plan");
        assert_eq!(planned, current);

        let blanks = UpdateRequest {
            id: Some(String::new()),
            first_name: Some(String::new()),
            last_name: Some(String::new()),
            address: Some(String::new()),
            birthdate: Some(String::new()),
        };
        let planned = plan_update(&current, &blanks, today()).expect("plan");
        assert_eq!(planned, current);
    }

    /// Resubmitting the current value is not a change, so it skips validation.
    #[test]
    fn unchanged_legacy_values_are_not_revalidated() {
        let mut current = adult_details("23AB$%12XY");
        current.address = "legacy address without pipes".to_string();
        let request = UpdateRequest {
            address: Some(current.address.clone()),
            first_name: Some("Johnny".to_string()),
            ..UpdateRequest::default()
        };
        let planned = plan_update(&current, &request, today()).expect("plan");
        assert_eq!(planned.first_name, "Johnny");
        assert_eq!(planned.address, current.address);
    }

    #[test]
    fn changed_fields_are_validated() {
        let current = adult_details("23AB$%12XY");
        let cases = [
            (
                UpdateRequest {
                    id: Some("23ABCDEF12".to_string()),
                    ..UpdateRequest::default()
                },
                Field::Id,
            ),
            (
                UpdateRequest {
                    last_name: Some("Smith2".to_string()),
                    ..UpdateRequest::default()
                },
                Field::LastName,
            ),
            (
                UpdateRequest {
                    address: Some("1|Sydney|2000|NSW|AU".to_string()),
                    ..UpdateRequest::default()
                },
                Field::Address,
            ),
            (
                UpdateRequest {
                    birthdate: Some("31-02-1990".to_string()),
                    ..UpdateRequest::default()
                },
                Field::Birthdate,
            ),
        ];
        for (request, field) in cases {
            let err = plan_update(&current, &request, today()).expect_err("should reject");
            assert!(
                matches!(err, Rejection::Invalid { field: f, .. } if f == field),
                "{err:?}"
            );
        }
    }

    #[test]
    fn minor_cannot_change_address() {
        let current = minor_details("67EF!*56GH");
        let request = UpdateRequest {
            address: Some(NEW_ADDRESS.to_string()),
            ..UpdateRequest::default()
        };
        assert_eq!(
            plan_update(&current, &request, today()),
            Err(Rejection::Rule(BusinessRule::MinorAddressLock))
        );

        let rename = UpdateRequest {
            first_name: Some("Robert".to_string()),
            ..UpdateRequest::default()
        };
        assert!(plan_update(&current, &rename, today()).is_ok());
    }

    #[test]
    fn adult_can_change_address() {
        let current = adult_details("23AB$%12XY");
        let request = UpdateRequest {
            address: Some(NEW_ADDRESS.to_string()),
            ..UpdateRequest::default()
        };
        let planned = plan_update(&current, &request, today()).expect("plan");
        assert_eq!(planned.address, NEW_ADDRESS);
    }

    /// The lock turns off on the 18th birthday itself.
    #[test]
    fn minor_lock_boundary_is_eighteenth_birthday() {
        let mut current = adult_details("23AB$%12XY");
        current.birthdate = "16-10-2008".to_string();
        let request = UpdateRequest {
            address: Some(NEW_ADDRESS.to_string()),
            ..UpdateRequest::default()
        };
        assert!(plan_update(&current, &request, today()).is_ok());

        current.birthdate = "17-10-2008".to_string();
        assert_eq!(
            plan_update(&current, &request, today()),
            Err(Rejection::Rule(BusinessRule::MinorAddressLock))
        );
    }

    #[test]
    fn birthdate_change_must_be_alone() {
        let current = adult_details("23AB$%12XY");
        let others = [
            UpdateRequest {
                id: Some("35CD@#34EF".to_string()),
                ..UpdateRequest::default()
            },
            UpdateRequest {
                first_name: Some("Jonathan".to_string()),
                ..UpdateRequest::default()
            },
            UpdateRequest {
                last_name: Some("Jones".to_string()),
                ..UpdateRequest::default()
            },
            UpdateRequest {
                address: Some(NEW_ADDRESS.to_string()),
                ..UpdateRequest::default()
            },
        ];
        // Every non-empty combination of the four co-changeable fields.
        for mask in 1u8..16 {
            let mut request = UpdateRequest {
                birthdate: Some("20-06-1990".to_string()),
                ..UpdateRequest::default()
            };
            for (bit, other) in others.iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    continue;
                }
                request.id = request.id.or_else(|| other.id.clone());
                request.first_name = request.first_name.or_else(|| other.first_name.clone());
                request.last_name = request.last_name.or_else(|| other.last_name.clone());
                request.address = request.address.or_else(|| other.address.clone());
            }
            assert_eq!(
                plan_update(&current, &request, today()),
                Err(Rejection::Rule(BusinessRule::BirthdateExclusivity)),
                "mask {mask:#06b}"
            );
        }

        let alone = UpdateRequest {
            birthdate: Some("20-06-1990".to_string()),
            ..UpdateRequest::default()
        };
        let planned = plan_update(&current, &alone, today()).expect("plan");
        assert_eq!(planned.birthdate, "20-06-1990");
    }

    /// A minor correcting their birthdate alone is not caught by the address lock.
    #[test]
    fn birthdate_correction_allowed_for_minor() {
        let current = minor_details("67EF!*56GH");
        let request = UpdateRequest {
            birthdate: Some("25-12-2010".to_string()),
            ..UpdateRequest::default()
        };
        assert!(plan_update(&current, &request, today()).is_ok());
    }

    #[test]
    fn even_first_digit_freezes_identifier() {
        let current = adult_details("48XY@#12AB");
        let request = UpdateRequest {
            id: Some("29CD$%@#EF".to_string()),
            ..UpdateRequest::default()
        };
        assert_eq!(
            plan_update(&current, &request, today()),
            Err(Rejection::Rule(BusinessRule::EvenIdentifierLock))
        );

        let rename = UpdateRequest {
            first_name: Some("Michael".to_string()),
            last_name: Some("Williams".to_string()),
            ..UpdateRequest::default()
        };
        assert!(plan_update(&current, &rename, today()).is_ok());
    }

    #[test]
    fn odd_or_non_digit_first_character_allows_identifier_change() {
        let request = UpdateRequest {
            id: Some("29CD$%@#EF".to_string()),
            ..UpdateRequest::default()
        };
        for id in ["37AB$%12XY", "93AB$%12XY", "X3AB$%12XY"] {
            let current = adult_details(id);
            let planned = plan_update(&current, &request, today()).expect("plan");
            assert_eq!(planned.id, "29CD$%@#EF");
        }
    }

    #[test]
    fn even_digit_detection() {
        assert!(starts_with_even_digit("48XY@#12AB"));
        assert!(starts_with_even_digit("0"));
        assert!(starts_with_even_digit("23AB$%12XY"));
        assert!(!starts_with_even_digit("37AB$%12XY"));
        assert!(!starts_with_even_digit("AB"));
        assert!(!starts_with_even_digit(""));
    }

    /// A malformed stored birthdate only matters when the minor lock must consult it.
    #[test]
    fn unparseable_stored_birthdate() {
        let mut current = adult_details("23AB$%12XY");
        current.birthdate = "1990/03/15".to_string();

        let rename = UpdateRequest {
            first_name: Some("Johnny".to_string()),
            ..UpdateRequest::default()
        };
        assert!(plan_update(&current, &rename, today()).is_ok());

        let moving = UpdateRequest {
            address: Some(NEW_ADDRESS.to_string()),
            ..UpdateRequest::default()
        };
        assert_eq!(
            plan_update(&current, &moving, today()),
            Err(Rejection::invalid(Field::Birthdate, "1990/03/15"))
        );
    }
}
