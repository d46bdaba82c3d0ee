//! Test-only helpers: record builders and in-memory collaborators.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

use crate::core::dates::parse_date;
use crate::core::types::{DemeritHistory, PersonDetails, PersonRecord};
use crate::io::offense_log::{OffenseEntry, OffenseLog};
use crate::io::record_store::{RecordStore, StoreError};

/// Parse a `DD-MM-YYYY` literal, panicking on typos in test data.
pub fn date(text: &str) -> NaiveDate {
    parse_date(text).unwrap_or_else(|| panic!("bad test date {text:?}"))
}

/// Build a demerit history from `(DD-MM-YYYY, points)` pairs.
pub fn history(entries: &[(&str, u8)]) -> DemeritHistory {
    entries
        .iter()
        .map(|(text, points)| (date(text), *points))
        .collect()
}

/// Valid details for an adult (born 15-03-1990) living in Victoria.
pub fn adult_details(id: &str) -> PersonDetails {
    PersonDetails {
        id: id.to_string(),
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        address: "1|Melbourne|3000|Victoria|AU".to_string(),
        birthdate: "15-03-1990".to_string(),
    }
}

/// Valid details for a subject born 10-12-2010.
pub fn minor_details(id: &str) -> PersonDetails {
    PersonDetails {
        id: id.to_string(),
        first_name: "Bob".to_string(),
        last_name: "Wilson".to_string(),
        address: "789 Pine Rd|Melbourne|3002|Victoria|AU".to_string(),
        birthdate: "10-12-2010".to_string(),
    }
}

pub fn adult_record(id: &str) -> PersonRecord {
    PersonRecord::new(adult_details(id))
}

/// Record store kept in a `Vec`, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<PersonRecord>,
}

impl MemoryRecordStore {
    pub fn with_records(records: Vec<PersonRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}

impl RecordStore for MemoryRecordStore {
    fn find_by_id(&mut self, id: &str) -> Result<Option<PersonRecord>, StoreError> {
        Ok(self.position(id).map(|index| self.records[index].clone()))
    }

    fn append(&mut self, record: &PersonRecord) -> Result<(), StoreError> {
        if self.position(record.id()).is_some() {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn replace(&mut self, id: &str, record: &PersonRecord) -> Result<(), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.id() != id && self.position(record.id()).is_some() {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }
        self.records[index] = record.clone();
        Ok(())
    }
}

/// Offense log that keeps entries in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingOffenseLog {
    pub entries: Vec<OffenseEntry>,
}

impl OffenseLog for RecordingOffenseLog {
    fn append_entry(&mut self, entry: &OffenseEntry) -> Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}

/// Offense log whose every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingOffenseLog;

impl OffenseLog for FailingOffenseLog {
    fn append_entry(&mut self, _entry: &OffenseEntry) -> Result<()> {
        Err(anyhow!("audit log unavailable"))
    }
}
