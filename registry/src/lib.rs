//! Road-registry driver records: registration, detail updates, demerit points.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic rules (field validation, update locks,
//!   rolling demerit totals). No I/O, "today" is always a parameter.
//! - **[`io`]**: Side-effecting pieces (record file, offense audit log, config,
//!   clock). Each sits behind a trait so tests can swap in memory fakes.
//!
//! [`lifecycle`] composes the two into the operations the CLI exposes.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod lifecycle;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
