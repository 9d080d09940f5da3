use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    NewProfile, Profile, ProfileFieldError, ProfileId, Submission, SubmissionId, SubmissionStatus,
};
use super::repository::{IntakeRepository, RepositoryError};
use super::runner::{
    CompletionHandler, CompletionOutcome, CompletionScheduler, ResolveError, ScheduleError,
};
use super::storage::{DocumentStore, StorageError};
use super::validate::{validate_pdf, UploadError, UploadLimits};

/// An incoming document as the HTTP layer hands it over.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The lifecycle engine: validates transitions, enforces the lock, and
/// hands completed submissions to the runner.
///
/// All mutations funnel through the repository's compare-and-set, so two
/// racing `submit` calls resolve to exactly one winner without any lock
/// held here.
pub struct IntakeService<R, D, C> {
    repository: Arc<R>,
    documents: Arc<D>,
    scheduler: Arc<C>,
    limits: UploadLimits,
}

impl<R, D, C> IntakeService<R, D, C>
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    pub fn new(
        repository: Arc<R>,
        documents: Arc<D>,
        scheduler: Arc<C>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            repository,
            documents,
            scheduler,
            limits,
        }
    }

    /// Validate profile fields, assign a fresh id, and persist.
    pub fn create_profile(&self, fields: NewProfile) -> Result<Profile, IntakeError> {
        fields.validate()?;
        let profile = Profile::create(fields);
        let stored = self
            .repository
            .insert_profile(profile)
            .map_err(IntakeError::repository)?;
        info!(profile_id = %stored.id, "profile created");
        Ok(stored)
    }

    /// Validate and store an uploaded PDF, creating a submission in
    /// `UPLOADED`. No record is created when validation fails.
    pub fn create_submission(
        &self,
        profile_id: ProfileId,
        upload: DocumentUpload,
    ) -> Result<Submission, IntakeError> {
        self.repository
            .fetch_profile(&profile_id)
            .map_err(IntakeError::repository)?
            .ok_or(IntakeError::NotFound("profile"))?;

        validate_pdf(
            upload.filename.as_deref(),
            upload.content_type.as_deref(),
            &upload.bytes,
            self.limits,
        )?;

        let id = SubmissionId::generate();
        let document_key = self.documents.store(&id, &upload.bytes)?;
        let submission = Submission {
            id,
            profile_id,
            filename: upload
                .filename
                .unwrap_or_else(|| format!("{id}.pdf")),
            document_key,
            status: SubmissionStatus::Uploaded,
            locked: false,
            created_at: Utc::now(),
        };

        let stored = self
            .repository
            .insert_submission(submission)
            .map_err(IntakeError::repository)?;
        info!(submission_id = %stored.id, profile_id = %profile_id, "submission uploaded");
        Ok(stored)
    }

    /// Lock the submission, move it to `PROCESSING`, and schedule the
    /// completion work. Returns without waiting on the outcome.
    ///
    /// The status check and the lock are one compare-and-set; a submission
    /// that is anything other than `UPLOADED` fails with a conflict, which
    /// is how re-submission is refused.
    pub fn submit(&self, id: &SubmissionId) -> Result<Submission, IntakeError> {
        let submission = self
            .repository
            .transition_submission(id, SubmissionStatus::Uploaded, SubmissionStatus::Processing)
            .map_err(|error| match error {
                RepositoryError::NotFound => IntakeError::NotFound("submission"),
                RepositoryError::StateMismatch { current, .. } => {
                    IntakeError::Conflict { current }
                }
                other => IntakeError::repository(other),
            })?;

        self.scheduler.schedule(submission.id)?;
        info!(submission_id = %submission.id, "submission locked and scheduled");
        Ok(submission)
    }

    /// Current persisted state. Pure read; never mutates.
    pub fn get_status(&self, id: &SubmissionId) -> Result<Submission, IntakeError> {
        self.repository
            .fetch_submission(id)
            .map_err(IntakeError::repository)?
            .ok_or(IntakeError::NotFound("submission"))
    }

    /// Apply the runner's terminal outcome. Called only from the completion
    /// worker.
    ///
    /// Idempotent: a retried delivery that finds the submission already
    /// terminal is a no-op. Finding it still `UPLOADED` means the runner was
    /// handed a submission that never went through `submit`, which is a bug
    /// surfaced as a conflict.
    pub fn resolve_completion(
        &self,
        id: &SubmissionId,
        outcome: CompletionOutcome,
    ) -> Result<Submission, IntakeError> {
        let next = outcome.terminal_status();
        match self
            .repository
            .transition_submission(id, SubmissionStatus::Processing, next)
        {
            Ok(submission) => Ok(submission),
            Err(RepositoryError::StateMismatch { current, .. }) if current.is_terminal() => {
                debug!(submission_id = %id, status = %current, "completion already applied");
                self.get_status(id)
            }
            Err(RepositoryError::StateMismatch { current, .. }) => {
                Err(IntakeError::Conflict { current })
            }
            Err(RepositoryError::NotFound) => Err(IntakeError::NotFound("submission")),
            Err(other) => Err(IntakeError::repository(other)),
        }
    }

    /// Re-enqueue every submission left in `PROCESSING`, so work interrupted
    /// by a restart still reaches a terminal state. Run once at startup.
    pub fn resume_processing(&self) -> Result<usize, IntakeError> {
        let stuck = self
            .repository
            .processing_submissions()
            .map_err(IntakeError::repository)?;
        for submission in &stuck {
            self.scheduler.schedule(submission.id)?;
        }
        if !stuck.is_empty() {
            info!(count = stuck.len(), "resumed in-flight submissions");
        }
        Ok(stuck.len())
    }
}

impl<R, D, C> CompletionHandler for IntakeService<R, D, C>
where
    R: IntakeRepository + 'static,
    D: DocumentStore + 'static,
    C: CompletionScheduler + 'static,
{
    fn resolve(&self, id: &SubmissionId, outcome: CompletionOutcome) -> Result<(), ResolveError> {
        match self.resolve_completion(id, outcome) {
            Ok(_) => Ok(()),
            Err(error @ IntakeError::Repository(_)) => {
                Err(ResolveError::Retryable(error.to_string()))
            }
            Err(error) => Err(ResolveError::Fatal(error.to_string())),
        }
    }
}

/// Error taxonomy of the lifecycle engine. Validation, not-found, and
/// conflict are expected caller outcomes; storage and scheduling failures
/// are infrastructural.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    InvalidProfile(#[from] ProfileFieldError),
    #[error(transparent)]
    InvalidUpload(#[from] UploadError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid state transition: submission is {current}")]
    Conflict { current: SubmissionStatus },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Scheduler(#[from] ScheduleError),
    #[error("repository failure: {0}")]
    Repository(RepositoryError),
}

impl IntakeError {
    fn repository(error: RepositoryError) -> Self {
        Self::Repository(error)
    }
}
