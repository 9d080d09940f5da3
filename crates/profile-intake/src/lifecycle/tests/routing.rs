use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use crate::lifecycle::auth::BearerAuth;
use crate::lifecycle::domain::{SubmissionStatus, SubmissionView};
use crate::lifecycle::router::intake_router;

const BOUNDARY: &str = "intake-test-boundary";

fn build_router() -> (axum::Router, std::sync::Arc<TestService>) {
    let (service, _, _, _) = build_service();
    let router = intake_router(service.clone(), BearerAuth::new(TEST_TOKEN), 1024 * 1024);
    (router, service)
}

fn profile_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/v1/profiles")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(
            serde_json::to_vec(&new_profile()).expect("serializes"),
        ))
        .expect("request builds")
}

fn upload_request(profile_id: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    Request::post(format!("/api/v1/submissions?profile_id={profile_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(
            BOUNDARY,
            filename,
            content_type,
            bytes,
        )))
        .expect("request builds")
}

#[tokio::test]
async fn healthz_is_open_and_ok() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::get("/healthz")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], serde_json::json!(true));
}

#[tokio::test]
async fn missing_token_is_rejected_with_challenge() {
    let (router, _) = build_router();

    let response = router
        .oneshot(profile_request(None))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
    let body = read_json(response).await;
    assert_eq!(body["error"]["kind"], "unauthorized");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let (router, _) = build_router();

    let response = router
        .oneshot(profile_request(Some("wrong")))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_profile_returns_201_with_id() {
    let (router, _) = build_router();

    let response = router
        .oneshot(profile_request(Some(TEST_TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert!(body["id"].is_string());
    assert_eq!(body["first_name"], "John");
    assert_eq!(body["email"], "john@test.com");
}

#[tokio::test]
async fn create_profile_rejects_bad_email() {
    let (router, _) = build_router();

    let mut fields = new_profile();
    fields.email = "not-an-email".to_string();
    let request = Request::post("/api/v1/profiles")
        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&fields).expect("serializes")))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn upload_against_unknown_profile_is_404() {
    let (router, _) = build_router();

    let response = router
        .oneshot(upload_request(
            "00000000-0000-0000-0000-000000000000",
            "resume.pdf",
            "application/pdf",
            b"%PDF-1.4\n",
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn upload_with_garbage_profile_id_is_404() {
    let (router, _) = build_router();

    let response = router
        .oneshot(upload_request(
            "not-a-uuid",
            "resume.pdf",
            "application/pdf",
            b"%PDF-1.4\n",
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_rejects_png_payload() {
    let (router, service) = build_router();
    let profile = service.create_profile(new_profile()).expect("creates");

    let response = router
        .oneshot(upload_request(
            &profile.id.to_string(),
            "img.png",
            "image/png",
            b"\x89PNG\r\n\x1a\nfake",
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn upload_creates_an_uploaded_submission() {
    let (router, service) = build_router();
    let profile = service.create_profile(new_profile()).expect("creates");

    let response = router
        .oneshot(upload_request(
            &profile.id.to_string(),
            "resume.pdf",
            "application/pdf",
            b"%PDF-1.4\n%fake pdf for tests\n",
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let view: SubmissionView = serde_json::from_value(body).expect("deserializes");
    assert_eq!(view.status, SubmissionStatus::Uploaded);
    assert!(!view.locked);
    assert_eq!(view.filename, "resume.pdf");
    assert_eq!(view.profile_id, profile.id);
}

#[tokio::test]
async fn submit_transitions_and_resubmit_conflicts() {
    let (router, service) = build_router();
    let profile = service.create_profile(new_profile()).expect("creates");
    let submission = service
        .create_submission(profile.id, pdf_upload())
        .expect("uploads");

    let submit = |router: axum::Router| {
        let path = format!("/api/v1/submissions/{}/submit", submission.id);
        async move {
            router
                .oneshot(
                    Request::post(path)
                        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
                        .body(Body::empty())
                        .expect("request builds"),
                )
                .await
                .expect("router responds")
        }
    };

    let response = submit(router.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let view: SubmissionView = serde_json::from_value(body).expect("deserializes");
    assert_eq!(view.status, SubmissionStatus::Processing);
    assert!(view.locked);

    let response = submit(router).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"]["kind"], "conflict");
}

#[tokio::test]
async fn submit_unknown_submission_is_404() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::post("/api/v1/submissions/00000000-0000-0000-0000-000000000000/submit")
                .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_endpoint_reflects_persisted_state() {
    let (router, service) = build_router();
    let profile = service.create_profile(new_profile()).expect("creates");
    let submission = service
        .create_submission(profile.id, pdf_upload())
        .expect("uploads");

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/submissions/{}", submission.id))
                .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let view: SubmissionView = serde_json::from_value(body).expect("deserializes");
    assert_eq!(view.id, submission.id);
    assert_eq!(view.status, SubmissionStatus::Uploaded);
}

#[tokio::test]
async fn status_for_garbage_id_is_404() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::get("/api/v1/submissions/not-a-uuid")
                .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
