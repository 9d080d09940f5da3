use std::sync::{Arc, Mutex};

use crate::lifecycle::domain::{
    NewProfile, Profile, ProfileId, Submission, SubmissionId, SubmissionStatus,
};
use crate::lifecycle::repository::{InMemoryIntakeRepository, IntakeRepository, RepositoryError};
use crate::lifecycle::runner::{CompletionScheduler, ScheduleError};
use crate::lifecycle::service::{DocumentUpload, IntakeService};
use crate::lifecycle::storage::MemoryDocumentStore;
use crate::lifecycle::validate::UploadLimits;

pub(super) const TEST_TOKEN: &str = "test-token";

pub(super) fn new_profile() -> NewProfile {
    NewProfile {
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        email: "john@test.com".to_string(),
        github_url: Some("https://github.com/johnsmith".to_string()),
    }
}

pub(super) fn pdf_upload() -> DocumentUpload {
    DocumentUpload {
        filename: Some("resume.pdf".to_string()),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4\n%fake pdf for tests\n".to_vec(),
    }
}

pub(super) fn png_upload() -> DocumentUpload {
    DocumentUpload {
        filename: Some("img.png".to_string()),
        content_type: Some("image/png".to_string()),
        bytes: b"\x89PNG\r\n\x1a\nfake".to_vec(),
    }
}

pub(super) fn limits() -> UploadLimits {
    UploadLimits::from_megabytes(1)
}

/// Scheduler double recording every handed-off submission id.
#[derive(Default)]
pub(super) struct RecordingScheduler {
    scheduled: Mutex<Vec<SubmissionId>>,
}

impl RecordingScheduler {
    pub(super) fn scheduled(&self) -> Vec<SubmissionId> {
        self.scheduled.lock().expect("scheduler mutex poisoned").clone()
    }
}

impl CompletionScheduler for RecordingScheduler {
    fn schedule(&self, id: SubmissionId) -> Result<(), ScheduleError> {
        self.scheduled
            .lock()
            .expect("scheduler mutex poisoned")
            .push(id);
        Ok(())
    }
}

/// Scheduler double simulating a dead worker.
pub(super) struct ClosedScheduler;

impl CompletionScheduler for ClosedScheduler {
    fn schedule(&self, _id: SubmissionId) -> Result<(), ScheduleError> {
        Err(ScheduleError::WorkerGone)
    }
}

/// Repository double simulating an unreachable backend.
pub(super) struct UnavailableRepository;

impl IntakeRepository for UnavailableRepository {
    fn insert_profile(&self, _profile: Profile) -> Result<Profile, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn fetch_profile(&self, _id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn insert_submission(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn fetch_submission(
        &self,
        _id: &SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn transition_submission(
        &self,
        _id: &SubmissionId,
        _expected: SubmissionStatus,
        _next: SubmissionStatus,
    ) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn processing_submissions(&self) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }
}

pub(super) type TestService =
    IntakeService<InMemoryIntakeRepository, MemoryDocumentStore, RecordingScheduler>;

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<InMemoryIntakeRepository>,
    Arc<MemoryDocumentStore>,
    Arc<RecordingScheduler>,
) {
    let repository = Arc::new(InMemoryIntakeRepository::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let scheduler = Arc::new(RecordingScheduler::default());
    let service = Arc::new(IntakeService::new(
        repository.clone(),
        documents.clone(),
        scheduler.clone(),
        limits(),
    ));
    (service, repository, documents, scheduler)
}

/// Assemble a multipart body carrying a single `file` part.
pub(super) fn multipart_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

pub(super) async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body reads");
    serde_json::from_slice(&body).expect("body is json")
}
