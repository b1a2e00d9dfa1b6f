//! HTTP request handlers for the SG Reconciliation API.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::sources::SourceTables;

use super::request::ReconciliationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reconcile", post(reconcile_handler))
        .with_state(state)
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Handler for POST /reconcile endpoint.
///
/// Accepts the three source tables and returns the reconciliation result.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReconciliationRequest>, JsonRejection>,
) -> Response {
    // Correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reconciliation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // The body text carries serde's description of the problem
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let tables: SourceTables = request.into();
    if let Err(err) = tables.ensure_non_empty() {
        warn!(correlation_id = %correlation_id, error = %err, "Empty source table");
        return error_response(err.into());
    }

    match state.engine().reconcile(&tables) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                reconciliation_id = %result.reconciliation_id,
                records = result.records.len(),
                unmatched_lines = result.unmatched_lines.len(),
                total_variance = %result.totals.total_variance,
                duration_us = result.audit_trace.duration_us,
                "Reconciliation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Reconciliation failed"
            );
            error_response(err.into())
        }
    }
}
