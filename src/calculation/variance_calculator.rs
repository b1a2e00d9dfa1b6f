//! Variance between SG liability and disbursements.
//!
//! Liability groups are left-joined onto disbursement groups. A liability
//! group with no payment gets `total_disbursed = 0`; that is an expected
//! reconciliation state, not an error. Disbursement groups with no liability
//! are not part of the joined table; [`unreconciled`] returns them separately.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DisbursementAggregate, FiscalQuarter, LiabilityAggregate, ReconciliationTotals,
    VarianceRecord,
};

const STAGE: &str = "variance";

fn overflow(what: &str) -> EngineError {
    EngineError::computation(STAGE, format!("{} overflowed", what))
}

/// Joins liability onto disbursements and computes the variance per group.
///
/// Positive variance is an under-payment, negative an over-payment. Output
/// order follows `liability`.
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::combine;
/// use sg_reconciliation::models::{DisbursementAggregate, FiscalQuarter, LiabilityAggregate};
/// use rust_decimal::Decimal;
///
/// let quarter = FiscalQuarter { year: 2024, quarter: 1 };
/// let liability = vec![LiabilityAggregate {
///     employee_code: "E1".to_string(),
///     fiscal_quarter: quarter,
///     total_ote: Decimal::new(1000, 0),
///     total_super_payable: Decimal::new(95, 0),
/// }];
/// let disbursed = vec![DisbursementAggregate {
///     employee_code: "E1".to_string(),
///     fiscal_quarter: quarter,
///     total_disbursed: Decimal::new(100, 0),
/// }];
///
/// let records = combine(&liability, &disbursed).unwrap();
/// assert_eq!(records[0].variance, Decimal::new(-5, 0));
/// ```
pub fn combine(
    liability: &[LiabilityAggregate],
    disbursed: &[DisbursementAggregate],
) -> EngineResult<Vec<VarianceRecord>> {
    let mut paid: HashMap<(&str, FiscalQuarter), Decimal> = HashMap::with_capacity(disbursed.len());
    for group in disbursed {
        let total = paid
            .entry((group.employee_code.as_str(), group.fiscal_quarter))
            .or_insert(Decimal::ZERO);
        *total = total
            .checked_add(group.total_disbursed)
            .ok_or_else(|| overflow("disbursement total"))?;
    }

    liability
        .iter()
        .map(|group| {
            let total_disbursed = paid
                .get(&(group.employee_code.as_str(), group.fiscal_quarter))
                .copied()
                .unwrap_or(Decimal::ZERO);
            let variance = group
                .total_super_payable
                .checked_sub(total_disbursed)
                .ok_or_else(|| overflow("variance"))?;

            Ok(VarianceRecord {
                employee_code: group.employee_code.clone(),
                fiscal_quarter: group.fiscal_quarter,
                total_ote: group.total_ote,
                total_super_payable: group.total_super_payable,
                total_disbursed,
                variance,
            })
        })
        .collect()
}

/// Returns the disbursement groups that have no liability group.
///
/// These are payments for quarters with no OTE-eligible earnings. They are
/// left out of [`combine`] and reported here instead.
pub fn unreconciled(
    liability: &[LiabilityAggregate],
    disbursed: &[DisbursementAggregate],
) -> Vec<DisbursementAggregate> {
    let owed: HashSet<(&str, FiscalQuarter)> = liability
        .iter()
        .map(|group| (group.employee_code.as_str(), group.fiscal_quarter))
        .collect();

    disbursed
        .iter()
        .filter(|group| !owed.contains(&(group.employee_code.as_str(), group.fiscal_quarter)))
        .inspect(|group| {
            warn!(
                employee_code = %group.employee_code,
                fiscal_quarter = %group.fiscal_quarter,
                total_disbursed = %group.total_disbursed,
                "Disbursement has no matching liability"
            );
        })
        .cloned()
        .collect()
}

/// Sums every column of the variance table.
pub fn summarize(records: &[VarianceRecord]) -> EngineResult<ReconciliationTotals> {
    records
        .iter()
        .try_fold(ReconciliationTotals::default(), |totals, record| {
            Ok(ReconciliationTotals {
                total_ote: totals
                    .total_ote
                    .checked_add(record.total_ote)
                    .ok_or_else(|| overflow("OTE total"))?,
                total_super_payable: totals
                    .total_super_payable
                    .checked_add(record.total_super_payable)
                    .ok_or_else(|| overflow("liability total"))?,
                total_disbursed: totals
                    .total_disbursed
                    .checked_add(record.total_disbursed)
                    .ok_or_else(|| overflow("disbursed total"))?,
                total_variance: totals
                    .total_variance
                    .checked_add(record.variance)
                    .ok_or_else(|| overflow("variance total"))?,
            })
        })
}
