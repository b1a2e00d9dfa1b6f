//! OTE aggregation and SG liability.
//!
//! OTE lines are grouped by employee and by the calendar quarter of their
//! period-end date. Liability is the group total multiplied by the SG rate,
//! left unrounded; rounding is a display concern.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{ClassifiedLine, LiabilityAggregate, OteAggregate};

use super::grouping::GroupedSums;

const STAGE: &str = "liability";

/// Sums OTE line amounts per (employee, earnings quarter).
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::aggregate_ote;
/// use sg_reconciliation::models::{ClassifiedLine, PayslipLine};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let lines: Vec<ClassifiedLine> = [600, 400]
///     .iter()
///     .map(|amount| ClassifiedLine {
///         line: PayslipLine {
///             employee_code: "E1".to_string(),
///             pay_code: "ORD".to_string(),
///             amount: Decimal::new(*amount, 0),
///             period_end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///         },
///         treatment: "OTE".to_string(),
///     })
///     .collect();
///
/// let totals = aggregate_ote(&lines).unwrap();
/// assert_eq!(totals.len(), 1);
/// assert_eq!(totals[0].total_ote, Decimal::new(1000, 0));
/// ```
pub fn aggregate_ote(lines: &[ClassifiedLine]) -> EngineResult<Vec<OteAggregate>> {
    let mut sums = GroupedSums::new(STAGE);
    for classified in lines {
        let line = &classified.line;
        sums.add(&line.employee_code, line.earnings_quarter(), line.amount)?;
    }

    debug!(lines = lines.len(), groups = sums.len(), "Aggregated OTE");

    Ok(sums
        .into_groups()
        .map(|((employee_code, fiscal_quarter), total_ote)| OteAggregate {
            employee_code,
            fiscal_quarter,
            total_ote,
        })
        .collect())
}

/// Computes `total_ote * sg_rate` without rounding.
pub fn super_payable(total_ote: Decimal, sg_rate: Decimal) -> EngineResult<Decimal> {
    total_ote.checked_mul(sg_rate).ok_or_else(|| {
        EngineError::computation(
            STAGE,
            format!("liability overflowed for OTE {} at rate {}", total_ote, sg_rate),
        )
    })
}

/// Attaches the SG liability to each OTE aggregate.
pub fn to_liability(
    aggregates: &[OteAggregate],
    sg_rate: Decimal,
) -> EngineResult<Vec<LiabilityAggregate>> {
    aggregates
        .iter()
        .map(|aggregate| {
            Ok(LiabilityAggregate {
                employee_code: aggregate.employee_code.clone(),
                fiscal_quarter: aggregate.fiscal_quarter,
                total_ote: aggregate.total_ote,
                total_super_payable: super_payable(aggregate.total_ote, sg_rate)?,
            })
        })
        .collect()
}
