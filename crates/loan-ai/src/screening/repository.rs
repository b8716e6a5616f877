use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::LoanDecision;
use super::domain::{ApplicantProfile, ApplicationId, ScreeningStatus};
use super::encoding::FeatureVector;

/// Outcome persisted once the classifier has scored an application. The
/// encoded frame is kept alongside the decision as the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub application_id: ApplicationId,
    pub decision: LoanDecision,
    pub signal: u8,
    pub features: FeatureVector,
}

/// Repository record containing the profile, outcome, and status metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRecord {
    pub profile: ApplicantProfile,
    pub status: ScreeningStatus,
    pub outcome: Option<ScreeningOutcome>,
    pub received_at: DateTime<Utc>,
}

impl ScreeningRecord {
    pub fn decision_rationale(&self) -> String {
        match &self.outcome {
            Some(outcome) => format!(
                "classifier signal {} -> {}",
                outcome.signal,
                outcome.decision.label()
            ),
            None => "pending evaluation".to_string(),
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.profile.application_id.clone(),
            status: self.status.label(),
            decision: self.outcome.as_ref().map(|outcome| outcome.decision.label()),
            decision_rationale: self.decision_rationale(),
            received_at: self.received_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError>;
    fn update(&self, record: ScreeningRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ScreeningRecord>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound decision notification hooks (servicing
/// systems, applicant e-mail adapters).
pub trait DecisionPublisher: Send + Sync {
    fn publish(&self, alert: DecisionAlert) -> Result<(), AlertError>;
}

/// Notification payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionAlert {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    pub decision_rationale: String,
    pub received_at: DateTime<Utc>,
}
