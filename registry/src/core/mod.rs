//! Deterministic, pure logic shared by the registry.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! records, take "today" as an argument, and return deterministic outputs
//! suitable for tests.

pub mod dates;
pub mod suspension;
pub mod types;
pub mod update;
pub mod validator;
