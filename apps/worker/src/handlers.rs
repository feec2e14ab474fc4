use axum::Json;
use axum::extract::State;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::{HealthResponse, ReconciliationResponse, RoleDocumentWrittenRequest};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Reconciles one role document write.
///
/// Answers 200 for every well-formed event, even when the identity provider
/// rejected a call, so the delivery system does not redeliver it.
pub async fn role_document_written_handler(
    State(state): State<AppState>,
    Json(payload): Json<RoleDocumentWrittenRequest>,
) -> ApiResult<Json<ReconciliationResponse>> {
    let event_id = payload
        .event_id()
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
    let change = payload.into_change(&state.document_path)?;

    info!(
        event_id = %event_id,
        user_id = %change.user_id(),
        "role document change received"
    );

    let report = state.reconciler.reconcile(&change).await;

    if !report.is_fully_applied() {
        warn!(
            event_id = %event_id,
            user_id = %report.user_id,
            branch = report.branch.as_str(),
            "role document change handled with identity provider failures"
        );
    }

    Ok(Json(ReconciliationResponse { event_id, report }))
}
