//! Side-effecting collaborators: record store, offense log, clock, config.

pub mod clock;
pub mod codec;
pub mod config;
pub mod offense_log;
pub mod record_store;
