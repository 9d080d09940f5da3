use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Identifier wrapper for submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SubmissionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Request payload for creating a profile. Fields default to empty so a
/// missing field surfaces as a validation error, not a framework rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub github_url: Option<String>,
}

impl NewProfile {
    /// Field-level validation applied before a profile is persisted.
    pub fn validate(&self) -> Result<(), ProfileFieldError> {
        if self.first_name.trim().is_empty() {
            return Err(ProfileFieldError::EmptyField { field: "first_name" });
        }
        if self.last_name.trim().is_empty() {
            return Err(ProfileFieldError::EmptyField { field: "last_name" });
        }
        if !email_is_plausible(&self.email) {
            return Err(ProfileFieldError::InvalidEmail {
                value: self.email.clone(),
            });
        }
        Ok(())
    }
}

/// Syntactic email check: one `@`, a non-empty local part, and a dotted
/// domain free of whitespace. Deliverability is not this service's problem.
fn email_is_plausible(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// The applicant entity owning submissions. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub github_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn create(fields: NewProfile) -> Self {
        Self {
            id: ProfileId::generate(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            github_url: fields.github_url,
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle status of a submission. Transitions only move forward:
/// `UPLOADED -> PROCESSING -> {COMPLETED | REJECTED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Uploaded,
    Processing,
    Completed,
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Uploaded => "UPLOADED",
            SubmissionStatus::Processing => "PROCESSING",
            SubmissionStatus::Completed => "COMPLETED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionStatus::Completed | SubmissionStatus::Rejected
        )
    }

    /// Whether the submission must be locked in this status.
    pub const fn locks(self) -> bool {
        !matches!(self, SubmissionStatus::Uploaded)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One uploaded document and its lifecycle state. The document bytes live
/// with the document store; `document_key` is the handle it returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub profile_id: ProfileId,
    pub filename: String,
    pub document_key: String,
    pub status: SubmissionStatus,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            id: self.id,
            profile_id: self.profile_id,
            filename: self.filename.clone(),
            status: self.status,
            locked: self.locked,
            created_at: self.created_at,
        }
    }
}

/// Wire representation of a submission; omits the storage handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: SubmissionId,
    pub profile_id: ProfileId,
    pub filename: String,
    pub status: SubmissionStatus,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

/// Malformed profile fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileFieldError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },
}
