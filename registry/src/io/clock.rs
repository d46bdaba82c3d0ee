//! Source of "today" for the registry.

use chrono::{Local, NaiveDate};

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A pinned date, for reproducible batch runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Pinned or live clock, as chosen by configuration.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl ConfiguredClock {
    pub fn new(pinned: Option<NaiveDate>) -> Self {
        match pinned {
            Some(date) => ConfiguredClock::Fixed(FixedClock(date)),
            None => ConfiguredClock::System(SystemClock),
        }
    }
}

impl Clock for ConfiguredClock {
    fn today(&self) -> NaiveDate {
        match self {
            ConfiguredClock::System(clock) => clock.today(),
            ConfiguredClock::Fixed(clock) => clock.today(),
        }
    }
}
