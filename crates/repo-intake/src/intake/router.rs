use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::ValidationOutcome;
use super::pipeline::RepoIntake;
use super::probe::ReachabilityProbe;
use super::report::IntakeReport;
use super::submission::EmbeddingScheduler;

/// Body accepted by the intake endpoints.
#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    pub repo_url: String,
}

/// Report plus the rendered messages a chat front end would post.
#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub thread_name: String,
    pub messages: Vec<String>,
    #[serde(flatten)]
    pub report: IntakeReport,
}

impl From<IntakeReport> for EmbeddingResponse {
    fn from(report: IntakeReport) -> Self {
        Self {
            thread_name: report.thread_name(),
            messages: report.messages(),
            report,
        }
    }
}

/// Router exposing submission and dry-run validation.
pub fn intake_router<P, S>(service: Arc<RepoIntake<P, S>>) -> Router
where
    P: ReachabilityProbe + 'static,
    S: EmbeddingScheduler + 'static,
{
    Router::new()
        .route("/api/v1/embeddings", post(submit_handler::<P, S>))
        .route("/api/v1/embeddings/check", post(check_handler::<P, S>))
        .with_state(service)
}

pub(crate) async fn submit_handler<P, S>(
    State(service): State<Arc<RepoIntake<P, S>>>,
    Json(request): Json<EmbeddingRequest>,
) -> Response
where
    P: ReachabilityProbe + 'static,
    S: EmbeddingScheduler + 'static,
{
    let report = service.submit(&request.repo_url).await;
    let status = if !report.validation.is_accepted() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    (status, Json(EmbeddingResponse::from(report))).into_response()
}

pub(crate) async fn check_handler<P, S>(
    State(service): State<Arc<RepoIntake<P, S>>>,
    Json(request): Json<EmbeddingRequest>,
) -> Response
where
    P: ReachabilityProbe + 'static,
    S: EmbeddingScheduler + 'static,
{
    let outcome = service.validate(&request.repo_url).await;
    let status = match outcome {
        ValidationOutcome::Accepted { .. } => StatusCode::OK,
        ValidationOutcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };

    (status, Json(outcome)).into_response()
}
