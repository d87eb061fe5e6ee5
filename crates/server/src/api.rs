//! JSON API for the assessment wizard and the back office.
//!
//! Endpoints:
//! - `POST /api/v1/pricing`                        — price an answer set (pure, nothing stored)
//! - `POST /api/v1/assessments`                    — create an assessment with its first breakdown
//! - `GET  /api/v1/assessments/{id}`               — fetch an assessment
//! - `PUT  /api/v1/assessments/{id}/answers`       — replace answers, recalculate, persist
//! - `POST /api/v1/assessments/{id}/status`        — triage status transition
//! - `POST /api/v1/suggestions`                    — project suggestions for an answer set
//! - `POST /api/v1/assessments/{id}/proposal`      — draft proposal document
//!
//! Engine-level failure modes (unknown project type, unresolved labels,
//! partial answers, narrator outages) all return best-effort 200 results; a
//! 4xx is reserved for bodies that cannot be parsed as answers at all and
//! for invalid ids/transitions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use estimo_agent::llm::TextGenerator;
use estimo_agent::writers::{ProposalWriter, SuggestionWriter};
use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::domain::assessment::{AssessmentId, AssessmentStatus, ProjectAssessment};
use estimo_core::errors::{ApplicationError, InterfaceError};
use estimo_core::pricing::engine::calculate_pricing;
use estimo_core::proposal::ProposalDocument;
use estimo_db::AssessmentRepository;

type SharedGenerator = Arc<dyn TextGenerator>;

#[derive(Clone)]
pub struct ApiState {
    repository: Arc<dyn AssessmentRepository>,
    suggestions: Arc<SuggestionWriter<SharedGenerator>>,
    proposals: Arc<ProposalWriter<SharedGenerator>>,
}

impl ApiState {
    pub fn new(repository: Arc<dyn AssessmentRepository>, generator: SharedGenerator) -> Self {
        Self {
            repository,
            suggestions: Arc::new(SuggestionWriter::new(generator.clone())),
            proposals: Arc::new(ProposalWriter::new(generator)),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/pricing", post(price_answers))
        .route("/api/v1/assessments", post(create_assessment))
        .route("/api/v1/assessments/{id}", get(get_assessment))
        .route("/api/v1/assessments/{id}/answers", put(update_answers))
        .route("/api/v1/assessments/{id}/status", post(update_status))
        .route("/api/v1/assessments/{id}/proposal", post(generate_proposal))
        .route("/api/v1/suggestions", post(generate_suggestions))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "correlationId")]
    correlation_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: AssessmentStatus,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposalResponse {
    proposal: ProposalDocument,
    markdown: String,
}

fn error_response(error: ApplicationError) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let interface = error.into_interface(correlation_id.clone());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorBody { error: interface.user_message().to_string(), correlation_id };
    (status, Json(body)).into_response()
}

fn not_found(id: &str) -> Response {
    let body = ErrorBody {
        error: format!("assessment `{id}` was not found"),
        correlation_id: Uuid::new_v4().to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn price_answers(Json(answers): Json<AssessmentAnswers>) -> Response {
    let breakdown = calculate_pricing(&answers);
    info!(
        event_name = "api.pricing.calculated",
        correlation_id = "pricing",
        assessment_id = "unsaved",
        subtotal = %breakdown.subtotal,
        "priced ad-hoc answer set"
    );
    Json(breakdown).into_response()
}

async fn create_assessment(
    State(state): State<ApiState>,
    Json(answers): Json<AssessmentAnswers>,
) -> Response {
    let mut assessment = ProjectAssessment::new(answers);
    assessment.replace_pricing(calculate_pricing(&assessment.answers));

    if let Err(error) = state.repository.save(&assessment).await {
        return error_response(ApplicationError::Persistence(error.to_string()));
    }

    info!(
        event_name = "api.assessment.created",
        correlation_id = "assessments",
        assessment_id = %assessment.id,
        "assessment created with initial breakdown"
    );
    (StatusCode::CREATED, Json(assessment)).into_response()
}

async fn get_assessment(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.repository.find_by_id(&AssessmentId(id.clone())).await {
        Ok(Some(assessment)) => Json(assessment).into_response(),
        Ok(None) => not_found(&id),
        Err(error) => error_response(ApplicationError::Persistence(error.to_string())),
    }
}

async fn update_answers(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(answers): Json<AssessmentAnswers>,
) -> Response {
    // A fresh breakdown on every edit; the stored one is replaced wholesale.
    let breakdown = calculate_pricing(&answers);

    match state.repository.update_pricing(&AssessmentId(id.clone()), &answers, &breakdown).await {
        Ok(Some(updated)) => {
            info!(
                event_name = "api.assessment.recalculated",
                correlation_id = "assessments",
                assessment_id = %updated.id,
                subtotal = %breakdown.subtotal,
                "answers updated and breakdown replaced"
            );
            Json(updated).into_response()
        }
        Ok(None) => not_found(&id),
        Err(error) => error_response(ApplicationError::Persistence(error.to_string())),
    }
}

async fn update_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Response {
    let mut assessment = match state.repository.find_by_id(&AssessmentId(id.clone())).await {
        Ok(Some(assessment)) => assessment,
        Ok(None) => return not_found(&id),
        Err(error) => return error_response(ApplicationError::Persistence(error.to_string())),
    };

    if let Err(error) = assessment.transition_to(request.status) {
        return error_response(ApplicationError::Domain(error));
    }

    if let Err(error) = state.repository.save(&assessment).await {
        return error_response(ApplicationError::Persistence(error.to_string()));
    }

    Json(assessment).into_response()
}

async fn generate_suggestions(
    State(state): State<ApiState>,
    Json(answers): Json<AssessmentAnswers>,
) -> Response {
    let suggestions = state.suggestions.generate(&answers).await;
    Json(SuggestionsResponse { suggestions }).into_response()
}

async fn generate_proposal(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let assessment = match state.repository.find_by_id(&AssessmentId(id.clone())).await {
        Ok(Some(assessment)) => assessment,
        Ok(None) => return not_found(&id),
        Err(error) => return error_response(ApplicationError::Persistence(error.to_string())),
    };

    let proposal = state.proposals.generate(&assessment.answers, assessment.id.clone()).await;
    let markdown = state.proposals.render_markdown(&proposal);

    info!(
        event_name = "api.proposal.generated",
        correlation_id = "proposal",
        assessment_id = %assessment.id,
        source = ?proposal.source,
        "proposal document assembled"
    );
    Json(ProposalResponse { proposal, markdown }).into_response()
}
