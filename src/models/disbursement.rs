//! Disbursement record model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One actual SG contribution payment made by the employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementRecord {
    /// The employee the contribution was paid for.
    pub employee_code: String,
    /// The date the payment was made; resolved to a quarter window.
    pub payment_made_date: NaiveDate,
    /// The contribution amount.
    pub sgc_amount: Decimal,
}
