//! Per employee, per quarter aggregates and the variance record.
//!
//! All aggregates share the composite key (`employee_code`, `fiscal_quarter`).
//! The OTE and disbursement aggregates are produced independently and only
//! meet in the [`VarianceRecord`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FiscalQuarter;

/// Total OTE earned by one employee in one quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OteAggregate {
    /// The employee.
    pub employee_code: String,
    /// The earnings quarter.
    pub fiscal_quarter: FiscalQuarter,
    /// Sum of OTE line amounts.
    pub total_ote: Decimal,
}

/// OTE total together with the SG liability derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityAggregate {
    /// The employee.
    pub employee_code: String,
    /// The earnings quarter.
    pub fiscal_quarter: FiscalQuarter,
    /// Sum of OTE line amounts.
    pub total_ote: Decimal,
    /// `total_ote` multiplied by the SG rate, unrounded.
    pub total_super_payable: Decimal,
}

/// Total SG actually paid for one employee in one quarter window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementAggregate {
    /// The employee.
    pub employee_code: String,
    /// The quarter the payment dates resolved to.
    pub fiscal_quarter: FiscalQuarter,
    /// Sum of contribution amounts.
    pub total_disbursed: Decimal,
}

/// Whether an employee/quarter was paid in full, short, or over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Liability equals disbursement.
    Balanced,
    /// Liability exceeds disbursement (positive variance).
    Underpaid,
    /// Disbursement exceeds liability (negative variance).
    Overpaid,
}

/// One row of the reconciliation result table.
///
/// # Example
///
/// ```
/// use sg_reconciliation::models::{FiscalQuarter, VarianceRecord, VarianceStatus};
/// use rust_decimal::Decimal;
///
/// let record = VarianceRecord {
///     employee_code: "E1".to_string(),
///     fiscal_quarter: FiscalQuarter { year: 2024, quarter: 1 },
///     total_ote: Decimal::new(1000, 0),
///     total_super_payable: Decimal::new(95, 0),
///     total_disbursed: Decimal::new(90, 0),
///     variance: Decimal::new(5, 0),
/// };
/// assert_eq!(record.status(), VarianceStatus::Underpaid);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceRecord {
    /// The employee.
    pub employee_code: String,
    /// The quarter.
    pub fiscal_quarter: FiscalQuarter,
    /// Sum of OTE line amounts.
    pub total_ote: Decimal,
    /// SG liability for the quarter.
    pub total_super_payable: Decimal,
    /// SG disbursed in the quarter window; zero when nothing was paid.
    pub total_disbursed: Decimal,
    /// `total_super_payable - total_disbursed`.
    pub variance: Decimal,
}

impl VarianceRecord {
    /// Classifies the sign of the variance.
    pub fn status(&self) -> VarianceStatus {
        if self.variance > Decimal::ZERO {
            VarianceStatus::Underpaid
        } else if self.variance < Decimal::ZERO {
            VarianceStatus::Overpaid
        } else {
            VarianceStatus::Balanced
        }
    }
}
