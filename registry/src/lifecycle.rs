//! Record lifecycle engine: registration, detail updates, demerit submissions.
//!
//! Every operation rehydrates the subject from the [`RecordStore`], applies
//! the pure rules from [`crate::core`] to a transient copy, and writes the
//! result back with a single store call. The store sits behind one mutex held
//! for the whole operation, so two operations never interleave and each sees
//! a consistent snapshot.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::core::dates::{format_date, parse_date};
use crate::core::suspension::{Assessment, Offense, assess, record_offense};
use crate::core::types::{PersonDetails, PersonRecord, Rejection, UpdateRequest};
use crate::core::update::{ChangeSet, plan_update};
use crate::core::validator::check_details;
use crate::error::RegistryError;
use crate::io::clock::{Clock, ConfiguredClock};
use crate::io::config::RegistryConfig;
use crate::io::offense_log::{FileOffenseLog, OffenseEntry, OffenseLog};
use crate::io::record_store::{FileRecordStore, RecordStore};

/// Result of an accepted demerit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemeritOutcome {
    /// The record as stored after the submission.
    pub record: PersonRecord,
    pub assessment: Assessment,
    /// True if this submission flipped the suspension flag.
    pub newly_suspended: bool,
}

/// A stored record together with its current demerit standing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub record: PersonRecord,
    /// `None` when the stored birthdate cannot be parsed.
    pub assessment: Option<Assessment>,
}

pub struct Registry<S, L, C> {
    store: Mutex<S>,
    offense_log: Mutex<L>,
    clock: C,
}

/// Registry backed by the flat files named in [`RegistryConfig`].
pub type FileRegistry = Registry<FileRecordStore, FileOffenseLog, ConfiguredClock>;

impl FileRegistry {
    /// Build a file-backed registry, resolving relative paths against `base`.
    pub fn from_config(config: &RegistryConfig, base: &Path) -> Result<Self> {
        config.validate()?;
        let paths = config.resolved(base);
        debug!(
            person_file = %paths.person_file.display(),
            demerit_log = %paths.demerit_log.display(),
            pinned_today = ?config.today,
            "opening file registry"
        );
        Ok(Registry::new(
            FileRecordStore::new(paths.person_file),
            FileOffenseLog::new(paths.demerit_log),
            ConfiguredClock::new(config.pinned_today()?),
        ))
    }
}

impl<S: RecordStore, L: OffenseLog, C: Clock> Registry<S, L, C> {
    pub fn new(store: S, offense_log: L, clock: C) -> Self {
        Self {
            store: Mutex::new(store),
            offense_log: Mutex::new(offense_log),
            clock,
        }
    }

    /// Take back the collaborators, e.g. to inspect them in tests.
    pub fn into_parts(self) -> (S, L) {
        (
            self.store.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.offense_log
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validate a new person and append them to the store.
    ///
    /// The new record has no offenses and is not suspended.
    #[instrument(skip_all, fields(id = %details.id))]
    pub fn register_person(&self, details: PersonDetails) -> Result<PersonRecord, RegistryError> {
        let today = self.today();
        check_details(&details, today).inspect_err(log_rejection)?;

        let record = PersonRecord::new(details);
        let mut store = self.lock_store();
        store.append(&record)?;
        info!("person registered");
        Ok(record)
    }

    /// Apply a partial update to the record stored under `id`.
    ///
    /// Returns the record as stored afterwards. On any error the store is
    /// left untouched.
    #[instrument(skip_all, fields(id = %id))]
    pub fn update_personal_details(
        &self,
        id: &str,
        request: &UpdateRequest,
    ) -> Result<PersonRecord, RegistryError> {
        let today = self.today();
        let mut store = self.lock_store();
        let current = store
            .find_by_id(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        let details = plan_update(&current.details, request, today)
            .inspect_err(log_rejection)?;
        let changes = ChangeSet::between(&current.details, &details);
        if changes.is_empty() {
            debug!("update carries no changes");
        }

        let updated = PersonRecord {
            details,
            ..current
        };
        store.replace(id, &updated)?;
        info!(new_id = updated.id(), ?changes, "personal details updated");
        Ok(updated)
    }

    /// Record an offense against the subject stored under `id`.
    ///
    /// Inputs are checked before the subject is loaded. The audit log entry
    /// is written after the store; a failure there is logged and ignored.
    #[instrument(skip_all, fields(id = %id, offense_date = %offense_date, points = points))]
    pub fn add_demerit_points(
        &self,
        id: &str,
        offense_date: &str,
        points: i64,
    ) -> Result<DemeritOutcome, RegistryError> {
        let today = self.today();
        let offense = Offense::parse(offense_date, points).inspect_err(log_rejection)?;

        let mut store = self.lock_store();
        let mut record = store
            .find_by_id(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let was_suspended = record.is_suspended;
        let assessment =
            record_offense(&mut record, offense, today).inspect_err(log_rejection)?;
        store.replace(id, &record)?;

        let newly_suspended = record.is_suspended && !was_suspended;
        info!(
            total = assessment.total,
            limit = assessment.limit,
            suspended = record.is_suspended,
            newly_suspended,
            "demerit points recorded"
        );

        let entry = OffenseEntry {
            id: id.to_string(),
            offense_date: format_date(offense.date),
            points: offense.points,
        };
        if let Err(err) = self.lock_offense_log().append_entry(&entry) {
            let err = format!("{err:#}");
            warn!(%err, "failed to append offense audit entry");
        }

        Ok(DemeritOutcome {
            record,
            assessment,
            newly_suspended,
        })
    }

    pub fn find_person(&self, id: &str) -> Result<PersonRecord, RegistryError> {
        self.lock_store()
            .find_by_id(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// The stored record plus its rolling total as of today.
    pub fn standing(&self, id: &str) -> Result<Standing, RegistryError> {
        let today = self.today();
        let record = self.find_person(id)?;
        let assessment = parse_date(&record.details.birthdate)
            .map(|birthdate| assess(&record.demerit_points, birthdate, today));
        Ok(Standing { record, assessment })
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_offense_log(&self) -> MutexGuard<'_, L> {
        self.offense_log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_rejection(rejection: &Rejection) {
    info!(reason = %rejection.reason_code(), "rejected: {rejection}");
}
