use crate::api::AppState;
use crate::error::AuditError;
use crate::export;
use crate::models::{BatchOutcome, ClientSummary};
use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body: client id plus the CT-e documents to audit.
#[derive(Debug, Deserialize)]
pub struct BatchAuditRequest {
    pub client: String,
    pub documents: Vec<String>,
}

/// Response body; `batch` carries the result handle and rows on success.
#[derive(Debug, Serialize)]
pub struct BatchAuditResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchOutcome>,
}

/// Health check.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Configured clients, in registry-file order.
pub async fn list_clients(State(state): State<AppState>) -> Json<Vec<ClientSummary>> {
    Json(state.reconciler.registry().summaries())
}

/// Batch reconciliation endpoint.
///
/// Always returns whatever could be computed; per-document failures show
/// up under `batch.skipped`, never as a request failure.
pub async fn batch_audit(
    State(state): State<AppState>,
    Json(req): Json<BatchAuditRequest>,
) -> Response {
    match state.reconciler.audit_batch(&req.client, &req.documents) {
        Ok(outcome) => {
            let message = format!(
                "{} documentos recebidos, {} conferidos, {} ignorados",
                req.documents.len(),
                outcome.results.len(),
                outcome.skipped.len()
            );
            let stored = state.batches.insert(outcome);
            let response = BatchAuditResponse {
                success: true,
                message,
                batch: Some((*stored).clone()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = match &e {
                AuditError::UnknownClient(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let response = BatchAuditResponse {
                success: false,
                message: e.to_string(),
                batch: None,
            };
            (status, Json(response)).into_response()
        }
    }
}

/// Downloads a completed batch as the audit CSV.
pub async fn export_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Response {
    let outcome = match state.batches.get(&batch_id) {
        Ok(outcome) => outcome,
        Err(e) => return export_error(e),
    };

    match export::render_csv(&outcome) {
        Ok(bytes) => {
            tracing::info!("Exporting batch {} ({} rows)", batch_id, outcome.results.len());
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        "text/csv; charset=utf-8".to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export::export_filename()),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => export_error(e),
    }
}

fn export_error(e: AuditError) -> Response {
    let status = match &e {
        AuditError::NoPriorResult => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(BatchAuditResponse {
            success: false,
            message: e.to_string(),
            batch: None,
        }),
    )
        .into_response()
}
