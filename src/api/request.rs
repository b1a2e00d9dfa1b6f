//! Request types for the SG Reconciliation API.
//!
//! This module defines the JSON request structures for the `/reconcile` endpoint.
//! Field names follow the typed models; the column names of the payroll
//! export are accepted as aliases.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DisbursementRecord, PayCodeRule, PayslipLine};
use crate::sources::SourceTables;

/// Request body for the `/reconcile` endpoint.
///
/// All three tables are required and must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRequest {
    /// Payslip earnings lines.
    pub payslips: Vec<PayslipLineRequest>,
    /// Pay code classification rules.
    pub pay_codes: Vec<PayCodeRuleRequest>,
    /// SG contribution payments.
    pub disbursements: Vec<DisbursementRequest>,
}

/// A payslip line in a reconciliation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipLineRequest {
    /// The employee the line was paid to.
    pub employee_code: String,
    /// The pay code as it appears on the payslip.
    #[serde(alias = "code")]
    pub pay_code: String,
    /// The amount paid.
    pub amount: Decimal,
    /// End date of the pay period.
    #[serde(alias = "end")]
    pub period_end_date: NaiveDate,
}

/// A pay code rule in a reconciliation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayCodeRuleRequest {
    /// The pay code.
    #[serde(alias = "pay_code")]
    pub code: String,
    /// The OTE treatment; absent or null leaves the code unclassified.
    #[serde(default, alias = "ote_treament")]
    pub ote_treatment: Option<String>,
}

/// A disbursement in a reconciliation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementRequest {
    /// The employee the contribution was paid for.
    pub employee_code: String,
    /// The date the payment was made.
    #[serde(alias = "payment_made")]
    pub payment_made_date: NaiveDate,
    /// The contribution amount.
    pub sgc_amount: Decimal,
}

impl From<PayslipLineRequest> for PayslipLine {
    fn from(req: PayslipLineRequest) -> Self {
        PayslipLine {
            employee_code: req.employee_code,
            pay_code: req.pay_code,
            amount: req.amount,
            period_end_date: req.period_end_date,
        }
    }
}

impl From<PayCodeRuleRequest> for PayCodeRule {
    fn from(req: PayCodeRuleRequest) -> Self {
        PayCodeRule {
            code: req.code,
            ote_treatment: req.ote_treatment,
        }
    }
}

impl From<DisbursementRequest> for DisbursementRecord {
    fn from(req: DisbursementRequest) -> Self {
        DisbursementRecord {
            employee_code: req.employee_code,
            payment_made_date: req.payment_made_date,
            sgc_amount: req.sgc_amount,
        }
    }
}

impl From<ReconciliationRequest> for SourceTables {
    fn from(req: ReconciliationRequest) -> Self {
        SourceTables {
            payslips: req.payslips.into_iter().map(Into::into).collect(),
            pay_codes: req.pay_codes.into_iter().map(Into::into).collect(),
            disbursements: req.disbursements.into_iter().map(Into::into).collect(),
        }
    }
}
