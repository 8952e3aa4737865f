//! Datestamps of varying granularity.
//!
//! Repositories may only support day granularity, so a datestamp is either
//! a calendar date or a UTC instant, and renders back in the same form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::error::{HarvesterError, Result};

/// Length of a day-granularity datestamp (`YYYY-MM-DD`).
const DATE_LEN: usize = 10;

/// A datestamp with either day or second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datestamp {
    /// Day granularity, e.g. `2001-01-01`.
    Date(NaiveDate),
    /// Second granularity in UTC, e.g. `2001-01-01T00:00:00Z`.
    Time(DateTime<Utc>),
}

impl Datestamp {
    /// Parse a datestamp from a response.
    ///
    /// # Examples
    /// ```
    /// use oai_harvester::Datestamp;
    ///
    /// let date = Datestamp::parse("2001-01-01").unwrap();
    /// assert!(date.is_date());
    ///
    /// let time = Datestamp::parse("2001-01-01T12:00:00Z").unwrap();
    /// assert_eq!(time.to_string(), "2001-01-01T12:00:00Z");
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || HarvesterError::InvalidDatestamp(value.to_string());

        if value.len() == DATE_LEN {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|_| invalid())
        } else {
            DateTime::parse_from_rfc3339(value)
                .map(|time| Self::Time(time.with_timezone(&Utc)))
                .map_err(|_| invalid())
        }
    }

    /// Whether this datestamp has day granularity.
    #[must_use]
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The calendar day this datestamp falls on (UTC).
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::Time(time) => time.date_naive(),
        }
    }
}

impl fmt::Display for Datestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Time(time) => write!(f, "{}", time.format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }
}

impl FromStr for Datestamp {
    type Err = HarvesterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Datestamp {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Datestamp {
    fn from(time: DateTime<Tz>) -> Self {
        Self::Time(time.with_timezone(&Utc))
    }
}

impl Serialize for Datestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_parse_date_granularity() {
        let stamp = Datestamp::parse("2001-01-01").unwrap();
        assert_eq!(
            stamp,
            Datestamp::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_parse_time_granularity() {
        let stamp = Datestamp::parse("2001-01-01T00:00:00Z").unwrap();
        assert_eq!(
            stamp,
            Datestamp::Time(Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_offset_is_normalized() {
        let stamp = Datestamp::parse("2001-01-01T01:00:00+01:00").unwrap();
        assert_eq!(stamp.to_string(), "2001-01-01T00:00:00Z");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Datestamp::parse("").is_err());
        assert!(Datestamp::parse("2001-13-01").is_err());
        assert!(Datestamp::parse("01/01/2001").is_err());
        assert!(Datestamp::parse("2001-01-01T00:00:00").is_err());
    }

    #[test]
    fn test_render_date() {
        let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(Datestamp::from(date).to_string(), "2001-01-01");
        assert_eq!(
            Datestamp::parse("2001-01-01").unwrap().to_string(),
            "2001-01-01"
        );
    }

    #[test]
    fn test_render_utc_time() {
        let time = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Datestamp::from(time).to_string(), "2001-01-01T00:00:00Z");
    }

    #[test]
    fn test_render_non_utc_time() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let time = offset.with_ymd_and_hms(2001, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(Datestamp::from(time).to_string(), "2001-01-01T00:00:00Z");
    }

    #[test]
    fn test_serialize_as_string() {
        let stamp = Datestamp::parse("2011-07-07T11:19:03Z").unwrap();
        assert_eq!(
            serde_json::to_string(&stamp).unwrap(),
            "\"2011-07-07T11:19:03Z\""
        );
    }
}
