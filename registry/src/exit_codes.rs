//! Stable exit codes for registry CLI commands.

/// The operation was accepted and persisted (or the record was shown).
pub const OK: i32 = 0;
/// Bad config, unreadable or unwritable storage, or a duplicate identifier.
pub const ERROR: i32 = 1;
/// Input failed validation or an update broke a business rule.
pub const REJECTED: i32 = 2;
/// No record carries the requested identifier.
pub const NOT_FOUND: i32 = 3;
