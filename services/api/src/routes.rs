use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use repo_intake::intake::{intake_router, EmbeddingScheduler, ReachabilityProbe, RepoIntake};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub(crate) fn with_service_routes<P, S>(intake: Arc<RepoIntake<P, S>>) -> Router
where
    P: ReachabilityProbe + 'static,
    S: EmbeddingScheduler + 'static,
{
    intake_router(intake)
        .route("/healthcheck", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> &'static str {
    info!("healthcheck endpoint called");
    "OK"
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use repo_intake::config::SourcegraphServer;
    use repo_intake::intake::{
        CodeHostAllowlist, Reachability, RepoIdentifier, SubmissionOutcome,
    };
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct StaticProbe;

    #[async_trait]
    impl ReachabilityProbe for StaticProbe {
        async fn probe(&self, _identifier: &RepoIdentifier) -> Reachability {
            Reachability::Reachable
        }
    }

    struct StaticScheduler;

    #[async_trait]
    impl EmbeddingScheduler for StaticScheduler {
        async fn schedule(&self, _identifier: &RepoIdentifier) -> SubmissionOutcome {
            SubmissionOutcome::Succeeded
        }
    }

    fn app(ready: bool) -> Router {
        let intake = Arc::new(RepoIntake::new(
            CodeHostAllowlist::default(),
            SourcegraphServer::default(),
            Arc::new(StaticProbe),
            Arc::new(StaticScheduler),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_service_routes(intake).layer(Extension(state))
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
    }

    #[tokio::test]
    async fn healthcheck_returns_ok() {
        let (status, body) = get_body(app(true), "/healthcheck").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, body) = get_body(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("initializing"));

        let (status, _) = get_body(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn intake_routes_are_mounted() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/embeddings")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"repo_url":"github.com/org/repo"}"#))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
