//! Core data models for the SG Reconciliation Engine.
//!
//! This module contains the source rows, the derived aggregates and the
//! result types used throughout the engine.

mod aggregate;
mod classification;
mod disbursement;
mod fiscal_quarter;
mod pay_code;
mod payslip;
mod reconciliation_result;

pub use aggregate::{
    DisbursementAggregate, LiabilityAggregate, OteAggregate, VarianceRecord, VarianceStatus,
};
pub use classification::{ClassifiedLine, UnmatchedLine, UnmatchedReason};
pub use disbursement::DisbursementRecord;
pub use fiscal_quarter::{FiscalQuarter, ParseFiscalQuarterError};
pub use pay_code::{PayCodeRule, normalize_pay_code};
pub use payslip::PayslipLine;
pub use reconciliation_result::{
    AuditStep, AuditTrace, AuditWarning, ReconciliationResult, ReconciliationTotals,
};
