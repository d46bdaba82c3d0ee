//! Road registry command-line adapter.
//!
//! Each invocation loads `registry.toml`, performs one operation against the
//! flat-file store and exits with a stable code from [`exit_codes`].

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use registry::core::dates::format_date;
use registry::core::types::{PersonDetails, UpdateRequest};
use registry::error::RegistryError;
use registry::exit_codes;
use registry::io::config::{CONFIG_FILE, RegistryConfig, load_config, write_config};
use registry::lifecycle::{FileRegistry, Standing};
use registry::logging;

#[derive(Parser)]
#[command(name = "registry", version, about = "Driver record registry")]
struct Cli {
    /// Config file. Data paths resolve against its directory.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the config file and create an empty record store if missing.
    Init {
        /// Overwrite an existing config. The record store is never cleared.
        #[arg(short, long)]
        force: bool,
    },
    /// Register a new person.
    Register(RegisterArgs),
    /// Change personal details of a registered person.
    Update {
        /// Identifier of the record to change.
        #[arg(value_name = "ID")]
        subject: String,

        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// Record an offense and re-evaluate suspension.
    Demerit {
        #[arg(value_name = "ID")]
        subject: String,

        /// Offense date, DD-MM-YYYY.
        #[arg(long)]
        date: String,

        /// Points for the offense (1-6).
        #[arg(long, allow_negative_numbers = true)]
        points: i64,
    },
    /// Print a record and its rolling demerit total as JSON.
    Show {
        #[arg(value_name = "ID")]
        subject: String,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// `Number|Street|City|State|Country`
    #[arg(long)]
    address: String,
    /// DD-MM-YYYY
    #[arg(long)]
    birthdate: String,
}

/// Replacement values. Absent or empty flags keep the stored value.
#[derive(Args)]
struct UpdateArgs {
    /// New identifier.
    #[arg(long = "id")]
    new_id: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    birthdate: Option<String>,
}

impl From<RegisterArgs> for PersonDetails {
    fn from(args: RegisterArgs) -> Self {
        PersonDetails {
            id: args.id,
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            birthdate: args.birthdate,
        }
    }
}

impl From<UpdateArgs> for UpdateRequest {
    fn from(args: UpdateArgs) -> Self {
        UpdateRequest {
            id: args.new_id,
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            birthdate: args.birthdate,
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run(Cli::parse()) {
        std::process::exit(report(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Register(args) => {
            let registry = open_registry(&cli.config)?;
            let record = registry.register_person(args.into())?;
            println!("registered {}", record.id());
            Ok(())
        }
        Command::Update { subject, changes } => {
            let registry = open_registry(&cli.config)?;
            let record = registry.update_personal_details(&subject, &changes.into())?;
            println!("updated {}", record.id());
            Ok(())
        }
        Command::Demerit {
            subject,
            date,
            points,
        } => {
            let registry = open_registry(&cli.config)?;
            let outcome = registry.add_demerit_points(&subject, &date, points)?;
            println!(
                "recorded {} total={} limit={} suspended={}",
                outcome.record.id(),
                outcome.assessment.total,
                outcome.assessment.limit,
                outcome.record.is_suspended
            );
            Ok(())
        }
        Command::Show { subject } => {
            let registry = open_registry(&cli.config)?;
            let standing = registry.standing(&subject)?;
            let payload = serde_json::to_string_pretty(&RecordView::from(&standing))
                .context("serialize record json")?;
            println!("{payload}");
            Ok(())
        }
    }
}

/// Print the failure and pick the exit code for it.
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RegistryError>() {
        Some(RegistryError::Rejected(rejection)) => {
            eprintln!("rejected: {}", rejection.reason_code());
            exit_codes::REJECTED
        }
        Some(RegistryError::NotFound(id)) => {
            eprintln!("not found: {id}");
            exit_codes::NOT_FOUND
        }
        _ => {
            eprintln!("{err:#}");
            exit_codes::ERROR
        }
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    let config = if force || !config_path.exists() {
        let config = RegistryConfig::default();
        write_config(config_path, &config)?;
        config
    } else {
        load_config(config_path)?
    };

    let paths = config.resolved(&base_dir(config_path));
    if let Some(parent) = paths.person_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.person_file)
        .with_context(|| format!("create {}", paths.person_file.display()))?;
    Ok(())
}

fn open_registry(config_path: &Path) -> Result<FileRegistry> {
    let config = load_config(config_path)?;
    FileRegistry::from_config(&config, &base_dir(config_path))
}

fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[derive(Serialize)]
struct RecordView<'a> {
    id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    address: &'a str,
    birthdate: &'a str,
    offenses: Vec<OffenseView>,
    is_suspended: bool,
    /// Absent when the stored birthdate is unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    rolling_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points_limit: Option<u32>,
}

#[derive(Serialize)]
struct OffenseView {
    date: String,
    points: u8,
}

impl<'a> From<&'a Standing> for RecordView<'a> {
    fn from(standing: &'a Standing) -> Self {
        let details = &standing.record.details;
        RecordView {
            id: &details.id,
            first_name: &details.first_name,
            last_name: &details.last_name,
            address: &details.address,
            birthdate: &details.birthdate,
            offenses: standing
                .record
                .demerit_points
                .iter()
                .map(|(date, points)| OffenseView {
                    date: format_date(*date),
                    points: *points,
                })
                .collect(),
            is_suspended: standing.record.is_suspended,
            rolling_total: standing.assessment.map(|assessment| assessment.total),
            points_limit: standing.assessment.map(|assessment| assessment.limit),
        }
    }
}
