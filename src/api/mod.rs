//! HTTP API module for the SG Reconciliation Engine.
//!
//! Exposes the reconciliation pipeline as a single `POST /reconcile`
//! endpoint taking the three source tables as JSON.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DisbursementRequest, PayCodeRuleRequest, PayslipLineRequest, ReconciliationRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
