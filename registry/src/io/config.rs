//! Registry configuration stored in `registry.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::dates::parse_date;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "registry.toml";

/// Registry configuration (TOML).
///
/// Relative paths resolve against the directory holding the config file.
/// Missing fields fall back to the legacy file names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Person record store, one record per line.
    pub person_file: PathBuf,

    /// Offense audit log.
    pub demerit_log: PathBuf,

    /// Pin "today" (`DD-MM-YYYY`) instead of reading the system clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            person_file: PathBuf::from("person.txt"),
            demerit_log: PathBuf::from("demerits.txt"),
            today: None,
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.person_file.as_os_str().is_empty() {
            return Err(anyhow!("person_file must not be empty"));
        }
        if self.demerit_log.as_os_str().is_empty() {
            return Err(anyhow!("demerit_log must not be empty"));
        }
        self.pinned_today()?;
        Ok(())
    }

    /// The pinned date, if configured.
    pub fn pinned_today(&self) -> Result<Option<NaiveDate>> {
        self.today
            .as_deref()
            .map(|text| {
                parse_date(text).ok_or_else(|| anyhow!("today must be DD-MM-YYYY (got {text:?})"))
            })
            .transpose()
    }

    /// Resolve configured paths against `base`.
    pub fn resolved(&self, base: &Path) -> ResolvedPaths {
        ResolvedPaths {
            person_file: base.join(&self.person_file),
            demerit_log: base.join(&self.demerit_log),
        }
    }
}

/// Absolute (or base-relative) locations of the registry's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub person_file: PathBuf,
    pub demerit_log: PathBuf,
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RegistryConfig::default()`.
pub fn load_config(path: &Path) -> Result<RegistryConfig> {
    if !path.exists() {
        let cfg = RegistryConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RegistryConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RegistryConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
