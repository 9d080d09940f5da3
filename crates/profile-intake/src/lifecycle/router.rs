use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::auth::{require_bearer, BearerAuth};
use super::domain::{NewProfile, ProfileId, SubmissionId};
use super::repository::IntakeRepository;
use super::runner::CompletionScheduler;
use super::service::{DocumentUpload, IntakeError, IntakeService};
use super::storage::DocumentStore;

/// Headroom on top of the document size cap for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    profile_id: String,
}

/// Router exposing the lifecycle endpoints under `/api/v1`, all behind
/// bearer auth. `/healthz` stays open for liveness probing.
pub fn intake_router<R, D, C>(
    service: Arc<IntakeService<R, D, C>>,
    auth: BearerAuth,
    max_upload_bytes: usize,
) -> Router
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    Router::new()
        .route("/api/v1/profiles", post(create_profile_handler::<R, D, C>))
        .route(
            "/api/v1/submissions",
            post(upload_submission_handler::<R, D, C>),
        )
        .route(
            "/api/v1/submissions/:submission_id/submit",
            post(submit_handler::<R, D, C>),
        )
        .route(
            "/api/v1/submissions/:submission_id",
            get(status_handler::<R, D, C>),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_bearer))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
        .route("/healthz", get(healthcheck))
        .with_state(service)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub(crate) async fn create_profile_handler<R, D, C>(
    State(service): State<Arc<IntakeService<R, D, C>>>,
    Json(payload): Json<NewProfile>,
) -> Response
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    match service.create_profile(payload) {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn upload_submission_handler<R, D, C>(
    State(service): State<Arc<IntakeService<R, D, C>>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Response
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    let Ok(profile_id) = query.profile_id.parse::<ProfileId>() else {
        return error_response(&IntakeError::NotFound("profile"));
    };

    let upload = match read_document_field(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    match service.create_submission(profile_id, upload) {
        Ok(submission) => (StatusCode::CREATED, Json(submission.view())).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn submit_handler<R, D, C>(
    State(service): State<Arc<IntakeService<R, D, C>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    let Ok(id) = submission_id.parse::<SubmissionId>() else {
        return error_response(&IntakeError::NotFound("submission"));
    };

    match service.submit(&id) {
        Ok(submission) => (StatusCode::OK, Json(submission.view())).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn status_handler<R, D, C>(
    State(service): State<Arc<IntakeService<R, D, C>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    let Ok(id) = submission_id.parse::<SubmissionId>() else {
        return error_response(&IntakeError::NotFound("submission"));
    };

    match service.get_status(&id) {
        Ok(submission) => (StatusCode::OK, Json(submission.view())).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Pull the `file` part out of the multipart body.
async fn read_document_field(mut multipart: Multipart) -> Result<DocumentUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(validation_response("multipart field 'file' is required"));
            }
            Err(error) => {
                return Err(validation_response(&format!(
                    "malformed multipart body: {error}"
                )));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                return Err(validation_response(&format!(
                    "failed to read uploaded file: {error}"
                )));
            }
        };

        return Ok(DocumentUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

fn validation_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": { "kind": "validation", "message": message }
        })),
    )
        .into_response()
}

/// Map engine errors onto the wire: machine-readable kind plus message.
pub(crate) fn error_response(error: &IntakeError) -> Response {
    let (status, kind) = match error {
        IntakeError::InvalidProfile(_) | IntakeError::InvalidUpload(_) => {
            (StatusCode::BAD_REQUEST, "validation")
        }
        IntakeError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        IntakeError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
        IntakeError::Storage(_) | IntakeError::Scheduler(_) | IntakeError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    };

    let body = Json(json!({
        "error": { "kind": kind, "message": error.to_string() }
    }));
    (status, body).into_response()
}
