//! Reconciliation result models.
//!
//! This module contains the [`ReconciliationResult`] type and the structures
//! that capture everything a run produces: the variance table, the warning
//! side channels, run totals and the audit trace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DisbursementAggregate, UnmatchedLine, VarianceRecord};

/// Sums over every record of a run.
///
/// # Example
///
/// ```
/// use sg_reconciliation::models::ReconciliationTotals;
/// use rust_decimal::Decimal;
///
/// let totals = ReconciliationTotals {
///     total_ote: Decimal::new(1000, 0),
///     total_super_payable: Decimal::new(95, 0),
///     total_disbursed: Decimal::new(90, 0),
///     total_variance: Decimal::new(5, 0),
/// };
/// assert_eq!(totals.total_super_payable - totals.total_disbursed, totals.total_variance);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    /// Sum of OTE across all records.
    pub total_ote: Decimal,
    /// Sum of SG liability across all records.
    pub total_super_payable: Decimal,
    /// Sum of disbursements joined to a liability record.
    pub total_disbursed: Decimal,
    /// Sum of variances.
    pub total_variance: Decimal,
}

/// A single step in the audit trace, one per pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Machine identifier of the stage (e.g. `ote_classification`).
    pub stage_id: String,
    /// Human-readable stage name.
    pub stage_name: String,
    /// Summary of the stage input.
    pub input: serde_json::Value,
    /// Summary of the stage output.
    pub output: serde_json::Value,
    /// Human-readable explanation of what the stage did.
    pub reasoning: String,
}

/// A warning generated during reconciliation.
///
/// Warnings flag data-quality issues that do not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of stage steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the run.
    pub warnings: Vec<AuditWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a reconciliation run.
///
/// The variance table (`records`) and the warning side channels
/// (`unmatched_lines`, `unreconciled_disbursements`) are kept apart so a
/// presenter can render them distinctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Unique identifier for this run.
    pub reconciliation_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The SG rate applied to OTE.
    pub sg_rate: Decimal,
    /// One record per employee/quarter with OTE liability.
    pub records: Vec<VarianceRecord>,
    /// Payslip lines with no resolvable OTE treatment.
    pub unmatched_lines: Vec<UnmatchedLine>,
    /// Number of lines with a non-OTE treatment.
    pub excluded_line_count: usize,
    /// Disbursement groups with no liability group to reconcile against.
    pub unreconciled_disbursements: Vec<DisbursementAggregate>,
    /// Sums over `records`.
    pub totals: ReconciliationTotals,
    /// Stage-by-stage audit trace.
    pub audit_trace: AuditTrace,
}

impl ReconciliationResult {
    /// Returns true when the run raised no data-quality warnings.
    pub fn is_clean(&self) -> bool {
        self.unmatched_lines.is_empty() && self.unreconciled_disbursements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FiscalQuarter, PayslipLine, UnmatchedReason};
    use chrono::NaiveDate;

    fn empty_result() -> ReconciliationResult {
        ReconciliationResult {
            reconciliation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            sg_rate: Decimal::new(95, 3),
            records: vec![],
            unmatched_lines: vec![],
            excluded_line_count: 0,
            unreconciled_disbursements: vec![],
            totals: ReconciliationTotals::default(),
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_empty_result_is_clean() {
        assert!(empty_result().is_clean());
    }

    #[test]
    fn test_unmatched_lines_make_result_unclean() {
        let mut result = empty_result();
        result.unmatched_lines.push(UnmatchedLine {
            line: PayslipLine {
                employee_code: "E1".to_string(),
                pay_code: "X".to_string(),
                amount: Decimal::ONE,
                period_end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            normalized_code: "X".to_string(),
            reason: UnmatchedReason::NoMatchingRule,
        });
        assert!(!result.is_clean());
    }

    #[test]
    fn test_unreconciled_disbursements_make_result_unclean() {
        let mut result = empty_result();
        result.unreconciled_disbursements.push(DisbursementAggregate {
            employee_code: "E1".to_string(),
            fiscal_quarter: FiscalQuarter { year: 2024, quarter: 2 },
            total_disbursed: Decimal::new(90, 0),
        });
        assert!(!result.is_clean());
    }

    #[test]
    fn test_serialize_result_keeps_side_channels_separate() {
        let json = serde_json::to_value(empty_result()).unwrap();
        assert!(json["records"].is_array());
        assert!(json["unmatched_lines"].is_array());
        assert!(json["unreconciled_disbursements"].is_array());
        assert_eq!(json["sg_rate"], "0.095");
        assert_eq!(json["audit_trace"]["duration_us"], 0);
    }
}
