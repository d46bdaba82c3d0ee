//! Durable record store.
//!
//! [`RecordStore`] is the seam between the lifecycle engine and storage. The
//! engine treats it as a map keyed by identifier; [`FileRecordStore`] keeps
//! that map as one line per record (see [`crate::io::codec`]).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::types::PersonRecord;
use crate::io::codec::{self, CodecError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record with id {0:?}")]
    NotFound(String),
    #[error("a record with id {0:?} already exists")]
    Duplicate(String),
    #[error("{path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: CodecError,
    },
    #[error("cannot encode record {id:?}: {source}")]
    Unencodable {
        id: String,
        #[source]
        source: CodecError,
    },
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Storage collaborator for person records.
pub trait RecordStore {
    fn find_by_id(&mut self, id: &str) -> Result<Option<PersonRecord>, StoreError>;

    /// Add a new record. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn append(&mut self, record: &PersonRecord) -> Result<(), StoreError>;

    /// Replace the record stored under `id`, which may carry a new id.
    ///
    /// Fails with [`StoreError::NotFound`] if `id` is absent, or
    /// [`StoreError::Duplicate`] if the new id belongs to another record.
    fn replace(&mut self, id: &str, record: &PersonRecord) -> Result<(), StoreError>;
}

/// Line-based flat file (`person.txt` by default).
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw store contents. A missing file reads as empty.
    fn read_contents(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(self.io_error("read store", source)),
        }
    }

    /// Non-blank lines of the store with their 1-based line numbers.
    fn read_lines(&self) -> Result<Vec<(usize, String)>, StoreError> {
        Ok(self
            .read_contents()?
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, line.to_string()))
            .collect())
    }

    fn decode_line(&self, number: usize, line: &str) -> Result<PersonRecord, StoreError> {
        codec::decode(line).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            line: number,
            source,
        })
    }

    fn io_error(&self, action: &'static str, source: io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }

    /// Rewrite the whole store atomically (temp file + rename).
    fn write_lines(&self, lines: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| self.io_error("create directory for", source))?;
        }
        let mut buf = lines.join("\n");
        buf.push('\n');
        let tmp_path = self.path.with_extension("txt.tmp");
        fs::write(&tmp_path, buf).map_err(|source| StoreError::Io {
            action: "write temp store",
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|source| self.io_error("replace store", source))
    }
}

fn encode(record: &PersonRecord) -> Result<String, StoreError> {
    codec::encode(record).map_err(|source| StoreError::Unencodable {
        id: record.id().to_string(),
        source,
    })
}

impl RecordStore for FileRecordStore {
    fn find_by_id(&mut self, id: &str) -> Result<Option<PersonRecord>, StoreError> {
        debug!(path = %self.path.display(), id, "looking up record");
        for (number, line) in self.read_lines()? {
            if codec::line_id(&line) == Some(id) {
                return self.decode_line(number, &line).map(Some);
            }
        }
        Ok(None)
    }

    fn append(&mut self, record: &PersonRecord) -> Result<(), StoreError> {
        let line = encode(record)?;
        let contents = self.read_contents()?;
        if contents
            .lines()
            .any(|existing| codec::line_id(existing) == Some(record.id()))
        {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }
        debug!(path = %self.path.display(), id = record.id(), "appending record");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error("open store", source))?;
        // Hand-edited stores may lack a final newline.
        let separator = if contents.is_empty() || contents.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        writeln!(file, "{separator}{line}")
            .map_err(|source| self.io_error("append to store", source))
    }

    fn replace(&mut self, id: &str, record: &PersonRecord) -> Result<(), StoreError> {
        let replacement = encode(record)?;
        let mut lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .map(|(_, line)| line)
            .collect();

        let position = lines
            .iter()
            .position(|line| codec::line_id(line) == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let renamed_onto_existing = record.id() != id
            && lines
                .iter()
                .any(|line| codec::line_id(line) == Some(record.id()));
        if renamed_onto_existing {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }

        debug!(path = %self.path.display(), id, new_id = record.id(), "rewriting record");
        lines[position] = replacement;
        self.write_lines(&lines)
    }
}
