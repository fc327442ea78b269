//! Calendar-date partition keys.
//!
//! Tasks are partitioned by the local calendar day they are due. The key is
//! the zero-padded `YYYY-MM-DD` rendering of the date's own components, with
//! no timezone conversion, so it is injective over calendar days and ignores
//! time-of-day entirely.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A `YYYY-MM-DD` partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        DateKey(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        ))
    }

    /// Truncates the time-of-day.
    pub fn from_datetime(moment: NaiveDateTime) -> Self {
        Self::from_date(moment.date())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
        Ok(DateKey::from_date(date))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey::from_date(date)
    }
}
