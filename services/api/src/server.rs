use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use repo_intake::config::AppConfig;
use repo_intake::error::AppError;
use repo_intake::intake::{HttpReachabilityProbe, RepoIntake, SubmissionClient};
use repo_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let sourcegraph = &config.sourcegraph;
    let token = sourcegraph.require_token()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let probe = Arc::new(HttpReachabilityProbe::new(sourcegraph.request_timeout)?);
    let scheduler = Arc::new(SubmissionClient::new(
        &sourcegraph.server,
        token,
        sourcegraph.request_timeout,
    )?);
    let intake = Arc::new(RepoIntake::new(
        sourcegraph.code_hosts.clone(),
        sourcegraph.server.clone(),
        probe,
        scheduler,
    ));

    let app = with_service_routes(intake)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        sourcegraph = %sourcegraph.server,
        "repository intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
