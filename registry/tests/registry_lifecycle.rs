//! End-to-end engine tests against the flat-file store.
//!
//! Each test builds a `FileRegistry` in a temp directory with "today" pinned
//! to 16-10-2026, runs operations through it, then inspects the files.

use std::fs;
use std::path::Path;

use registry::core::types::{BusinessRule, PersonDetails, Rejection, UpdateRequest};
use registry::error::RegistryError;
use registry::io::config::{CONFIG_FILE, RegistryConfig, load_config, write_config};
use registry::lifecycle::FileRegistry;

fn open(dir: &Path) -> FileRegistry {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        let cfg = RegistryConfig {
            today: Some("16-10-2026".to_string()),
            ..RegistryConfig::default()
        };
        write_config(&path, &cfg).expect("write config");
    }
    let cfg = load_config(&path).expect("load config");
    FileRegistry::from_config(&cfg, dir).expect("open registry")
}

fn person(id: &str, first: &str, last: &str, address: &str, birthdate: &str) -> PersonDetails {
    PersonDetails {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: address.to_string(),
        birthdate: birthdate.to_string(),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

#[test]
fn registration_writes_one_line_per_person() {
    let temp = tempfile::tempdir().expect("tempdir");
    let registry = open(temp.path());

    registry
        .register_person(person(
            "23AB$%12XY",
            "John",
            "Smith",
            "1|Melbourne|3000|Victoria|AU",
            "15-03-1990",
        ))
        .expect("john");
    let err = registry
        .register_person(person(
            "23ABCDEF12",
            "Jane",
            "Doe",
            "2|Melbourne|3000|Victoria|AU",
            "01-01-1985",
        ))
        .expect_err("bad id");
    assert_eq!(err.reason_code(), "invalid_id");

    assert_eq!(
        read(&temp.path().join("person.txt")),
        "23AB$%12XY,John,Smith,1|Melbourne|3000|Victoria|AU,15-03-1990,0,false\n"
    );
}

/// Values that pass validation read back from the file exactly as registered.
#[test]
fn stored_text_reads_back_verbatim() {
    let temp = tempfile::tempdir().expect("tempdir");
    let registered = open(temp.path())
        .register_person(person(
            "23;;AB12XY",
            "John ",
            " Smith",
            "Unit 3; 12 High St|Melbourne|3000|Victoria|AU",
            "15-03-1990",
        ))
        .expect("register");

    let found = open(temp.path()).find_person("23;;AB12XY").expect("find");
    assert_eq!(found, registered);
    assert_eq!(found.details.first_name, "John ");
}

/// A fresh engine over the same directory sees what an earlier one stored.
#[test]
fn records_survive_reopening() {
    let temp = tempfile::tempdir().expect("tempdir");
    open(temp.path())
        .register_person(person(
            "67EF!*56GH",
            "Bob",
            "Wilson",
            "789 Pine Rd|Melbourne|3002|Victoria|AU",
            "10-12-2010",
        ))
        .expect("register");

    let registry = open(temp.path());
    let err = registry
        .update_personal_details(
            "67EF!*56GH",
            &UpdateRequest {
                address: Some("999 New St|Melbourne|3003|Victoria|AU".to_string()),
                ..UpdateRequest::default()
            },
        )
        .expect_err("minor lock");
    assert_eq!(
        err.rejection(),
        Some(&Rejection::Rule(BusinessRule::MinorAddressLock))
    );

    let renamed = open(temp.path())
        .update_personal_details(
            "67EF!*56GH",
            &UpdateRequest {
                first_name: Some("Robert".to_string()),
                ..UpdateRequest::default()
            },
        )
        .expect("rename");
    assert_eq!(renamed.details.first_name, "Robert");
    assert_eq!(
        open(temp.path())
            .find_person("67EF!*56GH")
            .expect("find")
            .details
            .first_name,
        "Robert"
    );
}

#[test]
fn accumulated_demerits_suspend_and_are_audited() {
    let temp = tempfile::tempdir().expect("tempdir");
    let registry = open(temp.path());
    registry
        .register_person(person(
            "34CD#@78KL",
            "Alice",
            "Brown",
            "456 Oak Ave|Melbourne|3001|Victoria|AU",
            "01-01-1990",
        ))
        .expect("register");

    registry
        .add_demerit_points("34CD#@78KL", "01-01-2026", 6)
        .expect("first");
    registry
        .add_demerit_points("34CD#@78KL", "01-02-2026", 6)
        .expect("second");
    let third = registry
        .add_demerit_points("34CD#@78KL", "01-03-2026", 1)
        .expect("third");
    assert!(third.newly_suspended);

    assert_eq!(
        read(&temp.path().join("person.txt")),
        "34CD#@78KL,Alice,Brown,456 Oak Ave|Melbourne|3001|Victoria|AU,01-01-1990,\
         01-01-2026:6;01-02-2026:6;01-03-2026:1,true\n"
    );
    assert_eq!(
        read(&temp.path().join("demerits.txt")),
        "34CD#@78KL, 01-01-2026, 6\n34CD#@78KL, 01-02-2026, 6\n34CD#@78KL, 01-03-2026, 1\n"
    );

    let standing = open(temp.path()).standing("34CD#@78KL").expect("standing");
    let assessment = standing.assessment.expect("assessment");
    assert_eq!(assessment.total, 13);
    assert_eq!(assessment.limit, 12);
    assert!(standing.record.is_suspended);
}

#[test]
fn corrupt_store_surfaces_as_storage_failure() {
    let temp = tempfile::tempdir().expect("tempdir");
    let registry = open(temp.path());
    fs::write(temp.path().join("person.txt"), "23AB$%12XY,John\n").expect("write");

    let err = registry.find_person("23AB$%12XY").expect_err("malformed");
    assert!(matches!(err, RegistryError::Storage(_)), "{err:?}");
    assert_eq!(err.reason_code(), "storage_failure");
}
