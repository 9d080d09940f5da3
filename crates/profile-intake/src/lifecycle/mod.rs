//! Submission lifecycle: profiles, PDF uploads, and the enforced
//! `UPLOADED -> PROCESSING -> {COMPLETED | REJECTED}` state machine with
//! asynchronous completion.

pub mod auth;
pub mod domain;
pub mod repository;
pub mod router;
pub mod runner;
pub mod service;
pub mod storage;
pub mod validate;

#[cfg(test)]
mod tests;

pub use auth::BearerAuth;
pub use domain::{
    NewProfile, Profile, ProfileFieldError, ProfileId, Submission, SubmissionId, SubmissionStatus,
    SubmissionView,
};
pub use repository::{InMemoryIntakeRepository, IntakeRepository, RepositoryError};
pub use router::intake_router;
pub use runner::{
    spawn_worker, CompletionHandler, CompletionOutcome, CompletionRunner, CompletionScheduler,
    ProcessingPolicy, ResolveError, ScheduleError,
};
pub use service::{DocumentUpload, IntakeError, IntakeService};
pub use storage::{DocumentStore, FsDocumentStore, MemoryDocumentStore, StorageError};
pub use validate::{validate_pdf, UploadError, UploadLimits};
