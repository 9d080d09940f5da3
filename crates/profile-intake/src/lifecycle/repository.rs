use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{Profile, ProfileId, Submission, SubmissionId, SubmissionStatus};

/// Narrow persistence seam so the lifecycle engine stays storage-agnostic
/// and can be exercised against an in-memory implementation.
///
/// `transition_submission` is the single mutation path for lifecycle state:
/// a per-id compare-and-set that changes status and lock flag in one atomic
/// step. Racing callers are serialized here, not in the engine.
pub trait IntakeRepository: Send + Sync {
    fn insert_profile(&self, profile: Profile) -> Result<Profile, RepositoryError>;
    fn fetch_profile(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError>;

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;

    /// Atomically move a submission from `expected` to `next`, updating the
    /// lock flag in the same step. Fails with `StateMismatch` when the
    /// current status is not `expected`.
    fn transition_submission(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
    ) -> Result<Submission, RepositoryError>;

    /// Submissions currently in `PROCESSING`; used by the startup resume scan.
    fn processing_submissions(&self) -> Result<Vec<Submission>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("submission is {current}, expected {expected}")]
    StateMismatch {
        expected: SubmissionStatus,
        current: SubmissionStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map store. Each mutation holds the table lock for the
/// whole read-check-write, which gives the per-id atomicity the engine
/// relies on.
#[derive(Default, Clone)]
pub struct InMemoryIntakeRepository {
    profiles: Arc<Mutex<HashMap<ProfileId, Profile>>>,
    submissions: Arc<Mutex<HashMap<SubmissionId, Submission>>>,
}

impl IntakeRepository for InMemoryIntakeRepository {
    fn insert_profile(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Duplicate);
        }
        guard.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn fetch_profile(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        if guard.contains_key(&submission.id) {
            return Err(RepositoryError::Duplicate);
        }
        guard.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn transition_submission(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        let submission = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if submission.status != expected {
            return Err(RepositoryError::StateMismatch {
                expected,
                current: submission.status,
            });
        }
        submission.status = next;
        submission.locked = next.locks();
        Ok(submission.clone())
    }

    fn processing_submissions(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard
            .values()
            .filter(|submission| submission.status == SubmissionStatus::Processing)
            .cloned()
            .collect())
    }
}
