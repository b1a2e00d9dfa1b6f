//! Configuration types for SG reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `reconciliation.yaml`. [`ReconciliationConfig::default`]
//! carries the built-in Australian SG rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::QuarterResolver;
use crate::error::{EngineError, EngineResult};

/// The literal treatment marking a pay code as Ordinary Time Earnings.
pub const DEFAULT_OTE_MARKER: &str = "OTE";

/// The default SG rate (9.5%).
pub const DEFAULT_SG_RATE: Decimal = Decimal::from_parts(95, 0, 0, false, 3);

/// Metadata about the rules being applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionMetadata {
    /// Short code for the rule set (e.g., "AU-SG").
    pub code: String,
    /// The human-readable name of the rule set.
    pub name: String,
    /// URL to the official documentation.
    pub source_url: String,
}

/// A month and day without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    /// Month, 1 to 12.
    pub month: u32,
    /// Day of month, 1 to 31.
    pub day: u32,
}

impl MonthDay {
    /// Creates a month/day pair.
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    /// Returns this month/day in `year`, or `None` if it does not exist (Feb 29).
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// One fiscal quarter window, both ends inclusive.
///
/// A window whose end falls before its start in month/day order crosses the
/// year boundary: it starts in the labelled year and ends in the next one.
///
/// # Example
///
/// ```
/// use sg_reconciliation::config::{MonthDay, QuarterWindow};
///
/// let q4 = QuarterWindow {
///     quarter: 4,
///     start: MonthDay::new(10, 29),
///     end: MonthDay::new(1, 28),
/// };
/// assert!(q4.wraps_year());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWindow {
    /// The quarter number, 1 to 4.
    pub quarter: u8,
    /// First day of the window.
    pub start: MonthDay,
    /// Last day of the window.
    pub end: MonthDay,
}

impl QuarterWindow {
    /// Returns true if the window ends in the year after it starts.
    pub fn wraps_year(&self) -> bool {
        self.end < self.start
    }
}

/// The complete reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Metadata about the rule set.
    pub jurisdiction: JurisdictionMetadata,
    /// Fraction of OTE payable as SG.
    pub sg_rate: Decimal,
    /// Treatment value that marks a pay code as OTE.
    #[serde(default = "default_ote_marker")]
    pub ote_marker: String,
    /// The four quarter windows.
    pub quarters: Vec<QuarterWindow>,
}

fn default_ote_marker() -> String {
    DEFAULT_OTE_MARKER.to_string()
}

/// The SG payment windows: each closes 28 days after its calendar quarter ends.
pub fn default_quarter_windows() -> Vec<QuarterWindow> {
    vec![
        QuarterWindow {
            quarter: 1,
            start: MonthDay::new(1, 29),
            end: MonthDay::new(4, 28),
        },
        QuarterWindow {
            quarter: 2,
            start: MonthDay::new(4, 29),
            end: MonthDay::new(7, 28),
        },
        QuarterWindow {
            quarter: 3,
            start: MonthDay::new(7, 29),
            end: MonthDay::new(10, 28),
        },
        QuarterWindow {
            quarter: 4,
            start: MonthDay::new(10, 29),
            end: MonthDay::new(1, 28),
        },
    ]
}

impl ReconciliationConfig {
    /// Checks the whole configuration, including the quarter table.
    pub fn validate(&self) -> EngineResult<()> {
        self.validate_rules()?;
        QuarterResolver::new(&self.quarters).map(|_| ())
    }

    /// Checks the SG rate and the OTE marker.
    pub(crate) fn validate_rules(&self) -> EngineResult<()> {
        if self.sg_rate.is_sign_negative() || self.sg_rate > Decimal::ONE {
            return Err(EngineError::InvalidConfig {
                message: format!("sg_rate must be between 0 and 1, got {}", self.sg_rate),
            });
        }
        if self.ote_marker.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                message: "ote_marker must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            jurisdiction: JurisdictionMetadata {
                code: "AU-SG".to_string(),
                name: "Superannuation Guarantee (Australia)".to_string(),
                source_url: "https://www.ato.gov.au/businesses-and-organisations/super-for-employers"
                    .to_string(),
            },
            sg_rate: DEFAULT_SG_RATE,
            ote_marker: default_ote_marker(),
            quarters: default_quarter_windows(),
        }
    }
}
