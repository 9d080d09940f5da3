use crate::cli::ServeArgs;
use crate::infra::{processing_policy, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use profile_intake::config::AppConfig;
use profile_intake::error::AppError;
use profile_intake::lifecycle::{
    intake_router, spawn_worker, BearerAuth, CompletionRunner, FsDocumentStore,
    InMemoryIntakeRepository, IntakeError, IntakeService, UploadLimits,
};
use profile_intake::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryIntakeRepository::default());
    let documents = Arc::new(
        FsDocumentStore::new(config.storage.upload_dir.clone()).map_err(IntakeError::from)?,
    );
    let (runner, receiver) = CompletionRunner::channel();
    let service = Arc::new(IntakeService::new(
        repository,
        documents,
        Arc::new(runner),
        UploadLimits::from_megabytes(config.storage.max_file_size_mb),
    ));
    let _worker = spawn_worker(
        receiver,
        service.clone(),
        processing_policy(&config.processing),
    );

    // Work interrupted by a previous shutdown is re-driven to a terminal
    // state before traffic is accepted.
    service.resume_processing()?;

    let auth = BearerAuth::new(&config.auth.api_token);
    let app = with_service_routes(intake_router(
        service,
        auth,
        config.storage.max_file_bytes(),
    ))
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "profile intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
