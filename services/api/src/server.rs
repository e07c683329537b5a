use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAssessmentStore};
use crate::routes::with_routes;
use assessment_scoring::assessments::{QuestionBank, SubmissionPipeline, WindowedRateLimiter};
use assessment_scoring::config::AppConfig;
use assessment_scoring::error::AppError;
use assessment_scoring::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Duration;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if args.sessions.is_empty() {
        warn!("no sessions seeded; every submission will be rejected as unauthorized");
    }
    let store = args
        .sessions
        .into_iter()
        .fold(
            InMemoryAssessmentStore::seeded(&QuestionBank::standard()),
            |store, (token, subject)| store.with_session(&token, subject),
        );

    let assessments = &config.assessments;
    let mut pipeline = SubmissionPipeline::new(Arc::new(store))
        .with_idempotency_window(Duration::seconds(assessments.idempotency_window_secs));
    if let Some(limit) = &assessments.rate_limit {
        pipeline = pipeline.with_rate_limiter(Arc::new(WindowedRateLimiter::new(
            limit.max_requests,
            Duration::seconds(limit.window_secs),
        )));
        info!(
            max_requests = limit.max_requests,
            window_secs = limit.window_secs,
            "per-subject rate limiting enabled"
        );
    }

    let app = with_routes(Arc::new(pipeline))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        idempotency_window_secs = assessments.idempotency_window_secs,
        "assessment scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
