//! SG Reconciliation Engine for Australian Superannuation Guarantee
//!
//! This crate reconciles the SG liability implied by payroll against the
//! contributions actually disbursed, per employee and fiscal quarter. Payslip
//! lines are classified as Ordinary Time Earnings through a pay code table,
//! liability is OTE times the SG rate, and payments are assigned to quarters
//! through the SG payment windows.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod sources;
