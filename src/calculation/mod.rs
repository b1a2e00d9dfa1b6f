//! Calculation logic for the SG Reconciliation Engine.
//!
//! The pipeline stages live here: quarter resolution of payment dates, OTE
//! classification of payslip lines, liability and disbursement aggregation
//! per employee and quarter, and the variance join. [`ReconciliationEngine`]
//! runs them in sequence.

mod disbursement_aggregator;
mod grouping;
mod liability_aggregator;
mod ote_classifier;
mod pipeline;
mod quarter_resolver;
mod variance_calculator;

pub use disbursement_aggregator::aggregate_disbursements;
pub use grouping::GroupKey;
pub use liability_aggregator::{aggregate_ote, super_payable, to_liability};
pub use ote_classifier::{ClassificationOutcome, PayCodeIndex, classify, classify_with_index};
pub use pipeline::{ENGINE_VERSION, ReconciliationEngine};
pub use quarter_resolver::QuarterResolver;
pub use variance_calculator::{combine, summarize, unreconciled};
