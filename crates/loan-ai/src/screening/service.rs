use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError, LoanDecision};
use super::domain::{ApplicationId, LoanApplication, ScreeningStatus};
use super::encoding::{self, EncodingError, FeatureVector};
use super::intake::{self, IntakeError};
use super::repository::{
    AlertError, ApplicationRepository, DecisionAlert, DecisionPublisher, RepositoryError,
    ScreeningOutcome, ScreeningRecord,
};

/// Service composing intake, encoding, the classifier handle, storage, and
/// outbound decision alerts.
pub struct ScreeningService<R, P> {
    repository: Arc<R>,
    alerts: Arc<P>,
    classifier: Arc<dyn Classifier>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("loan-{id:06}"))
}

/// Result of a stateless, one-shot scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub decision: LoanDecision,
    pub signal: u8,
    pub features: FeatureVector,
}

impl<R, P> ScreeningService<R, P>
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<P>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            repository,
            alerts,
            classifier,
        }
    }

    /// Submit a new application, returning the repository-backed record.
    pub fn submit(
        &self,
        application: LoanApplication,
    ) -> Result<ScreeningRecord, ScreeningServiceError> {
        let mut profile = intake::validated_profile(application)?;
        let application_id = next_application_id();
        profile.application_id = application_id;

        let record = ScreeningRecord {
            profile,
            status: ScreeningStatus::Submitted,
            outcome: None,
            received_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Score a stored application and persist the decision.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let features = encoding::encode(&record.profile.application)?;
        let signal = self.classifier.predict(&features)?;
        let decision = LoanDecision::from_signal(signal);

        let outcome = ScreeningOutcome {
            application_id: record.profile.application_id.clone(),
            decision,
            signal,
            features,
        };

        record.status = match decision {
            LoanDecision::Approved => ScreeningStatus::Approved,
            LoanDecision::Rejected => ScreeningStatus::Rejected,
        };
        record.outcome = Some(outcome.clone());

        self.repository.update(record)?;

        if decision.is_approved() {
            let mut details = BTreeMap::new();
            details.insert("decision".to_string(), "approved".to_string());
            self.alerts.publish(DecisionAlert {
                template: "loan_approved".to_string(),
                application_id: outcome.application_id.clone(),
                details,
            })?;
        }

        Ok(outcome)
    }

    /// One-shot scoring without touching the repository: validate, encode,
    /// classify.
    pub fn predict(
        &self,
        application: LoanApplication,
    ) -> Result<Prediction, ScreeningServiceError> {
        let profile = intake::validated_profile(application)?;
        let features = encoding::encode(&profile.application)?;
        let signal = self.classifier.predict(&features)?;

        Ok(Prediction {
            decision: LoanDecision::from_signal(signal),
            signal,
            features,
        })
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ScreeningRecord, ScreeningServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}
