//! Fiscal quarter resolution for payment dates.
//!
//! SG payment windows do not follow calendar quarters: each window opens on the
//! 29th and closes on the 28th three months later, so a contribution paid up to
//! 28 days after a calendar quarter ends is still attributed to that quarter.
//! The window spanning New Year is labelled with the year it starts in, which
//! means 1–28 January belongs to the previous year's Q4.

use chrono::{Datelike, NaiveDate};

use crate::config::QuarterWindow;
use crate::error::{EngineError, EngineResult};
use crate::models::FiscalQuarter;

/// Years checked when validating that a window table covers the calendar.
/// One non-leap and one leap year.
const COVERAGE_CHECK_YEARS: [i32; 2] = [2023, 2024];

/// Maps calendar dates to fiscal quarters using a validated window table.
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::QuarterResolver;
/// use chrono::NaiveDate;
///
/// let resolver = QuarterResolver::default();
///
/// let jan_28 = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
/// assert_eq!(resolver.resolve(jan_28).unwrap().to_string(), "2023Q4");
///
/// let jan_29 = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();
/// assert_eq!(resolver.resolve(jan_29).unwrap().to_string(), "2024Q1");
/// ```
#[derive(Debug, Clone)]
pub struct QuarterResolver {
    windows: Vec<QuarterWindow>,
}

impl Default for QuarterResolver {
    fn default() -> Self {
        Self {
            windows: crate::config::default_quarter_windows(),
        }
    }
}

impl QuarterResolver {
    /// Builds a resolver, checking the window table first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if:
    /// - the table is empty, or a quarter number is outside 1 to 4 or repeated
    /// - a boundary is not a real month/day
    /// - some day of a leap or non-leap year falls in no window, or in several
    pub fn new(windows: &[QuarterWindow]) -> EngineResult<Self> {
        if windows.is_empty() {
            return Err(invalid_config("quarter table is empty"));
        }

        let mut seen = [false; 4];
        for window in windows {
            if !(1..=4).contains(&window.quarter) {
                return Err(invalid_config(format!(
                    "quarter number {} is outside 1..=4",
                    window.quarter
                )));
            }
            let slot = &mut seen[usize::from(window.quarter - 1)];
            if *slot {
                return Err(invalid_config(format!(
                    "quarter {} is defined more than once",
                    window.quarter
                )));
            }
            *slot = true;

            // 2024 is a leap year, so Feb 29 passes here and is caught by the coverage check
            for boundary in [window.start, window.end] {
                if boundary.in_year(2024).is_none() {
                    return Err(invalid_config(format!(
                        "quarter {} boundary {:02}-{:02} is not a calendar day",
                        window.quarter, boundary.month, boundary.day
                    )));
                }
            }
        }

        let resolver = Self {
            windows: windows.to_vec(),
        };
        resolver.check_coverage()?;
        Ok(resolver)
    }

    /// Returns the window table.
    pub fn windows(&self) -> &[QuarterWindow] {
        &self.windows
    }

    /// Resolves a date to its fiscal quarter.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::QuarterResolution`] if the date falls in no window
    /// or in more than one. A validated table never does this.
    pub fn resolve(&self, date: NaiveDate) -> EngineResult<FiscalQuarter> {
        let mut matched: Option<FiscalQuarter> = None;
        let mut matches = 0;

        for window in &self.windows {
            if let Some(year) = window_label_year(window, date) {
                matches += 1;
                matched = Some(FiscalQuarter {
                    year,
                    quarter: window.quarter,
                });
            }
        }

        match (matches, matched) {
            (1, Some(quarter)) => Ok(quarter),
            _ => Err(EngineError::QuarterResolution { date, matches }),
        }
    }

    /// Resolves a year/month/day triple, rejecting dates that do not exist.
    ///
    /// # Example
    ///
    /// ```
    /// use sg_reconciliation::calculation::QuarterResolver;
    /// use sg_reconciliation::error::EngineError;
    ///
    /// let resolver = QuarterResolver::default();
    /// assert_eq!(resolver.resolve_ymd(2024, 10, 29).unwrap().to_string(), "2024Q4");
    /// assert!(matches!(
    ///     resolver.resolve_ymd(2023, 2, 29),
    ///     Err(EngineError::InvalidDate { .. })
    /// ));
    /// ```
    pub fn resolve_ymd(&self, year: i32, month: u32, day: u32) -> EngineResult<FiscalQuarter> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(EngineError::InvalidDate { year, month, day })?;
        self.resolve(date)
    }

    fn check_coverage(&self) -> EngineResult<()> {
        for year in COVERAGE_CHECK_YEARS {
            let mut date = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or(EngineError::InvalidDate { year, month: 1, day: 1 })?;
            while date.year() == year {
                self.resolve(date).map_err(|err| match err {
                    EngineError::QuarterResolution { date, matches } => invalid_config(format!(
                        "quarter table maps {} to {} windows (expected exactly one)",
                        date, matches
                    )),
                    other => other,
                })?;
                date = match date.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        Ok(())
    }
}

/// Returns the label year if `date` falls inside `window`.
///
/// Start and end are anchored to the date's own year. For the wrapping window
/// the end moves to the next year, and a date on or before the end day (early
/// January) is attributed to the window that started the year before.
fn window_label_year(window: &QuarterWindow, date: NaiveDate) -> Option<i32> {
    let year = date.year();
    let wraps = window.wraps_year();
    let anchor = if wraps && (date.month(), date.day()) <= (window.end.month, window.end.day) {
        year - 1
    } else {
        year
    };

    let start = window.start.in_year(anchor)?;
    let end = window.end.in_year(if wraps { anchor + 1 } else { anchor })?;

    (start <= date && date <= end).then_some(anchor)
}

fn invalid_config(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
