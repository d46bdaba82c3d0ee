//! Offense audit log (`demerits.txt`).
//!
//! Product artifact: one `ID, DD-MM-YYYY, N` line per accepted demerit
//! submission. Independent of tracing and unaffected by `RUST_LOG`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One audit entry as written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffenseEntry {
    pub id: String,
    pub offense_date: String,
    pub points: u8,
}

impl OffenseEntry {
    pub fn to_line(&self) -> String {
        format!("{}, {}, {}", self.id, self.offense_date, self.points)
    }
}

/// Append-only audit sink. The registry treats failures as non-fatal.
pub trait OffenseLog {
    fn append_entry(&mut self, entry: &OffenseEntry) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileOffenseLog {
    path: PathBuf,
}

impl FileOffenseLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OffenseLog for FileOffenseLog {
    fn append_entry(&mut self, entry: &OffenseEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(file, "{}", entry.to_line())
            .with_context(|| format!("append to {}", self.path.display()))
    }
}
