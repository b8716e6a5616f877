use serde::{Deserialize, Serialize};

use super::encoding::FeatureVector;

/// Binary outcome reported to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    /// A zero signal rejects; any other signal approves.
    pub const fn from_signal(signal: u8) -> Self {
        match signal {
            0 => LoanDecision::Rejected,
            _ => LoanDecision::Approved,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "Approved",
            LoanDecision::Rejected => "Rejected",
        }
    }

    pub const fn is_approved(self) -> bool {
        matches!(self, LoanDecision::Approved)
    }
}

/// Runtime classifier failures.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Capability seam over the pre-trained model.
///
/// The production implementation is `ForestClassifier`; tests inject stubs
/// returning fixed signals.
pub trait Classifier: Send + Sync {
    /// Map an encoded feature vector to a binary signal (`0` or `1`).
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError>;
}
