//! Payslip line model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FiscalQuarter;

/// One earnings line on one payslip.
///
/// # Example
///
/// ```
/// use sg_reconciliation::models::PayslipLine;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let line = PayslipLine {
///     employee_code: "E1".to_string(),
///     pay_code: "ORD".to_string(),
///     amount: Decimal::new(1000, 0),
///     period_end_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
/// };
/// assert_eq!(line.earnings_quarter().to_string(), "2024Q1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    /// The employee the line was paid to.
    pub employee_code: String,
    /// The pay code as it appears on the payslip (not normalized).
    pub pay_code: String,
    /// The amount paid on this line.
    pub amount: Decimal,
    /// The end date of the pay period the line belongs to.
    pub period_end_date: NaiveDate,
}

impl PayslipLine {
    /// Returns the quarter whose liability this line's earnings accrue to.
    pub fn earnings_quarter(&self) -> FiscalQuarter {
        FiscalQuarter::calendar_quarter_of(self.period_end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_payslip_line() {
        let json = r#"{
            "employee_code": "1114",
            "pay_code": "Salary ",
            "amount": "1234.56",
            "period_end_date": "2023-10-31"
        }"#;

        let line: PayslipLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.employee_code, "1114");
        // raw code is kept; normalization happens at the join
        assert_eq!(line.pay_code, "Salary ");
        assert_eq!(line.amount, Decimal::new(123456, 2));
        assert_eq!(line.earnings_quarter().to_string(), "2023Q4");
    }

    #[test]
    fn test_serialize_amount_as_string() {
        let line = PayslipLine {
            employee_code: "E1".to_string(),
            pay_code: "ORD".to_string(),
            amount: Decimal::new(9550, 2),
            period_end_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        };
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"amount\":\"95.50\""));
        assert!(json.contains("\"period_end_date\":\"2024-07-01\""));
    }
}
