//! Look-back windows supported by the upstream API.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported period {0}: expected one of 7, 14, 30, 60, 90 days")]
pub struct PeriodError(pub String);

/// Number of calendar days a series covers, ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Period {
    Week,
    Fortnight,
    Month,
    TwoMonths,
    Quarter,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Week,
        Period::Fortnight,
        Period::Month,
        Period::TwoMonths,
        Period::Quarter,
    ];

    pub const fn days(self) -> u32 {
        match self {
            Period::Week => 7,
            Period::Fortnight => 14,
            Period::Month => 30,
            Period::TwoMonths => 60,
            Period::Quarter => 90,
        }
    }

    /// Number of daily points a series for this period holds.
    pub const fn points(self) -> usize {
        self.days() as usize
    }
}

impl TryFrom<u32> for Period {
    type Error = PeriodError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Period::ALL
            .into_iter()
            .find(|p| p.days() == days)
            .ok_or_else(|| PeriodError(days.to_string()))
    }
}

impl From<Period> for u32 {
    fn from(p: Period) -> Self {
        p.days()
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u32 = s.trim().parse().map_err(|_| PeriodError(s.to_string()))?;
        Period::try_from(days)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}
