//! Fiscal quarter label type.
//!
//! This module defines [`FiscalQuarter`], the `{year}Q{n}` label that keys every
//! aggregate in a reconciliation run.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A fiscal quarter such as `2024Q1`.
///
/// Ordering is chronological: by year, then by quarter number.
///
/// # Example
///
/// ```
/// use sg_reconciliation::models::FiscalQuarter;
///
/// let quarter: FiscalQuarter = "2024Q3".parse().unwrap();
/// assert_eq!(quarter.year, 2024);
/// assert_eq!(quarter.quarter, 3);
/// assert_eq!(quarter.to_string(), "2024Q3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalQuarter {
    /// The year the quarter is labelled with.
    pub year: i32,
    /// The quarter number, 1 to 4.
    pub quarter: u8,
}

impl FiscalQuarter {
    /// Creates a quarter label. Returns `None` unless `quarter` is 1 to 4.
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4)
            .contains(&quarter)
            .then_some(Self { year, quarter })
    }

    /// Returns the calendar quarter (Jan–Mar = Q1 ... Oct–Dec = Q4) containing `date`.
    ///
    /// This is the earnings quarter of a payslip line, keyed on its period-end date.
    ///
    /// # Example
    ///
    /// ```
    /// use sg_reconciliation::models::FiscalQuarter;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    /// assert_eq!(FiscalQuarter::calendar_quarter_of(date).to_string(), "2024Q1");
    /// ```
    pub fn calendar_quarter_of(date: NaiveDate) -> Self {
        // month0 is 0..=11, so the quarter is always 1..=4
        Self {
            year: date.year(),
            quarter: (date.month0() / 3) as u8 + 1,
        }
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Error returned when a string is not a `{year}Q{1..4}` label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid fiscal quarter label '{0}'")]
pub struct ParseFiscalQuarterError(String);

impl FromStr for FiscalQuarter {
    type Err = ParseFiscalQuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseFiscalQuarterError(s.to_string());
        let (year, quarter) = s.trim().split_once(['Q', 'q']).ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.parse::<u8>().map_err(|_| invalid())?;
        FiscalQuarter::new(year, quarter).ok_or_else(invalid)
    }
}

impl Serialize for FiscalQuarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FiscalQuarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_quarter() {
        assert!(FiscalQuarter::new(2024, 0).is_none());
        assert!(FiscalQuarter::new(2024, 5).is_none());
        assert!(FiscalQuarter::new(2024, 4).is_some());
    }

    #[test]
    fn test_calendar_quarter_boundaries() {
        assert_eq!(FiscalQuarter::calendar_quarter_of(date(2024, 1, 1)).to_string(), "2024Q1");
        assert_eq!(FiscalQuarter::calendar_quarter_of(date(2024, 3, 31)).to_string(), "2024Q1");
        assert_eq!(FiscalQuarter::calendar_quarter_of(date(2024, 4, 1)).to_string(), "2024Q2");
        assert_eq!(FiscalQuarter::calendar_quarter_of(date(2024, 9, 30)).to_string(), "2024Q3");
        assert_eq!(FiscalQuarter::calendar_quarter_of(date(2024, 12, 31)).to_string(), "2024Q4");
    }

    #[test]
    fn test_parse_accepts_lowercase_and_whitespace() {
        let quarter: FiscalQuarter = " 2023q4 ".parse().unwrap();
        assert_eq!(quarter, FiscalQuarter { year: 2023, quarter: 4 });
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2024".parse::<FiscalQuarter>().is_err());
        assert!("2024Q5".parse::<FiscalQuarter>().is_err());
        assert!("Q1".parse::<FiscalQuarter>().is_err());
        assert!("abcdQ1".parse::<FiscalQuarter>().is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut quarters: Vec<FiscalQuarter> = ["2024Q1", "2023Q4", "2024Q2", "2023Q1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        quarters.sort();
        let labels: Vec<String> = quarters.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["2023Q1", "2023Q4", "2024Q1", "2024Q2"]);
    }

    #[test]
    fn test_serializes_as_label_string() {
        let quarter = FiscalQuarter { year: 2024, quarter: 2 };
        assert_eq!(serde_json::to_string(&quarter).unwrap(), "\"2024Q2\"");

        let parsed: FiscalQuarter = serde_json::from_str("\"2021Q3\"").unwrap();
        assert_eq!(parsed, FiscalQuarter { year: 2021, quarter: 3 });
    }

    #[test]
    fn test_deserialize_invalid_label_fails() {
        let result = serde_json::from_str::<FiscalQuarter>("\"2021Q9\"");
        assert!(result.is_err());
    }
}
