use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::bureau::{BureauError, BureauGateway};
use super::domain::{ApplicantProfile, DocumentId, LoanRequest};
use super::repository::EvaluationRepository;
use super::service::{DecisionService, EvaluationError};

/// Request envelope for one evaluation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub applicant: ApplicantProfile,
    pub loan: LoanRequest,
}

/// Router builder exposing the evaluation and latest-result endpoints.
pub fn decision_router<B, R>(service: Arc<DecisionService<B, R>>) -> Router
where
    B: BureauGateway + 'static,
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route("/api/v1/credit/evaluations", post(evaluate_handler::<B, R>))
        .route(
            "/api/v1/credit/evaluations/:document_id/latest",
            get(latest_handler::<B, R>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<B, R>(
    State(service): State<Arc<DecisionService<B, R>>>,
    axum::Json(payload): axum::Json<EvaluationRequest>,
) -> Response
where
    B: BureauGateway + 'static,
    R: EvaluationRepository + 'static,
{
    match service.evaluate(&payload.applicant, &payload.loan).await {
        // approval and rejection are both successful evaluations
        Ok(decision) => {
            let view = decision.record().view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(EvaluationError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(EvaluationError::Bureau(BureauError::ServiceUnavailable(message))) => {
            let payload = json!({ "error": format!("credit bureau unavailable: {message}") });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn latest_handler<B, R>(
    State(service): State<Arc<DecisionService<B, R>>>,
    Path(document_id): Path<String>,
) -> Response
where
    B: BureauGateway + 'static,
    R: EvaluationRepository + 'static,
{
    let document = DocumentId(document_id);
    match service.latest(&document) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Ok(None) => {
            let payload = json!({
                "document_id": document.0,
                "error": "no evaluation on file",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
