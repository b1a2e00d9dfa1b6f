//! Disbursement aggregation.
//!
//! Each payment date is resolved to its quarter window and contribution
//! amounts are summed per (employee, quarter).

use tracing::debug;

use crate::error::EngineResult;
use crate::models::{DisbursementAggregate, DisbursementRecord};

use super::grouping::GroupedSums;
use super::quarter_resolver::QuarterResolver;

const STAGE: &str = "disbursement";

/// Sums contributions per (employee, payment quarter).
///
/// # Errors
///
/// Fails if a payment date cannot be resolved or a sum overflows; both are fatal.
///
/// # Example
///
/// ```
/// use sg_reconciliation::calculation::{QuarterResolver, aggregate_disbursements};
/// use sg_reconciliation::models::DisbursementRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let records = vec![DisbursementRecord {
///     employee_code: "E1".to_string(),
///     payment_made_date: NaiveDate::from_ymd_opt(2024, 4, 28).unwrap(),
///     sgc_amount: Decimal::new(90, 0),
/// }];
///
/// let totals = aggregate_disbursements(&records, &QuarterResolver::default()).unwrap();
/// assert_eq!(totals[0].fiscal_quarter.to_string(), "2024Q1");
/// ```
pub fn aggregate_disbursements(
    records: &[DisbursementRecord],
    resolver: &QuarterResolver,
) -> EngineResult<Vec<DisbursementAggregate>> {
    let mut sums = GroupedSums::new(STAGE);
    for record in records {
        let quarter = resolver.resolve(record.payment_made_date)?;
        sums.add(&record.employee_code, quarter, record.sgc_amount)?;
    }

    debug!(records = records.len(), groups = sums.len(), "Aggregated disbursements");

    Ok(sums
        .into_groups()
        .map(|((employee_code, fiscal_quarter), total_disbursed)| DisbursementAggregate {
            employee_code,
            fiscal_quarter,
            total_disbursed,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MonthDay, QuarterWindow};
    use crate::error::EngineError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn paid(employee: &str, date: &str, amount: &str) -> DisbursementRecord {
        DisbursementRecord {
            employee_code: employee.to_string(),
            payment_made_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            sgc_amount: dec(amount),
        }
    }

    #[test]
    fn test_payments_in_same_window_are_summed() {
        let records = vec![
            paid("E1", "2024-01-29", "40"),
            paid("E1", "2024-03-15", "30.50"),
            paid("E1", "2024-04-28", "19.50"),
        ];
        let totals = aggregate_disbursements(&records, &QuarterResolver::default()).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].fiscal_quarter.to_string(), "2024Q1");
        assert_eq!(totals[0].total_disbursed, dec("90"));
    }

    #[test]
    fn test_early_january_payment_counts_for_previous_q4() {
        let records = vec![paid("E1", "2024-01-28", "50"), paid("E1", "2023-11-10", "25")];
        let totals = aggregate_disbursements(&records, &QuarterResolver::default()).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].fiscal_quarter.to_string(), "2023Q4");
        assert_eq!(totals[0].total_disbursed, dec("75"));
    }

    #[test]
    fn test_window_boundary_splits_groups() {
        let records = vec![paid("E1", "2024-04-28", "10"), paid("E1", "2024-04-29", "20")];
        let totals = aggregate_disbursements(&records, &QuarterResolver::default()).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].fiscal_quarter.to_string(), "2024Q1");
        assert_eq!(totals[1].fiscal_quarter.to_string(), "2024Q2");
    }

    #[test]
    fn test_employees_are_grouped_separately() {
        let records = vec![paid("E2", "2024-06-01", "5"), paid("E1", "2024-06-01", "7")];
        let totals = aggregate_disbursements(&records, &QuarterResolver::default()).unwrap();
        assert_eq!(totals[0].employee_code, "E1");
        assert_eq!(totals[1].employee_code, "E2");
    }

    #[test]
    fn test_configured_windows_drive_grouping() {
        let windows = [QuarterWindow {
            quarter: 1,
            start: MonthDay::new(1, 1),
            end: MonthDay::new(12, 31),
        }];
        let resolver = QuarterResolver::new(&windows).unwrap();
        let records = vec![paid("E1", "2024-01-05", "5"), paid("E1", "2024-11-30", "6")];

        let totals = aggregate_disbursements(&records, &resolver).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].fiscal_quarter.to_string(), "2024Q1");
        assert_eq!(totals[0].total_disbursed, dec("11"));
    }

    #[test]
    fn test_amount_overflow_is_fatal() {
        let records = vec![
            DisbursementRecord {
                employee_code: "E1".to_string(),
                payment_made_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                sgc_amount: Decimal::MAX,
            },
            DisbursementRecord {
                employee_code: "E1".to_string(),
                payment_made_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                sgc_amount: Decimal::MAX,
            },
        ];
        let result = aggregate_disbursements(&records, &QuarterResolver::default());
        match result {
            Err(EngineError::ComputationError { stage, .. }) => assert_eq!(stage, "disbursement"),
            other => panic!("Expected ComputationError, got {:?}", other),
        }
    }
}
