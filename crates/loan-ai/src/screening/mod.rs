//! Loan application intake, encoding, and classifier-backed screening.
//!
//! The flow is deliberately linear: a typed submission passes intake
//! validation, is encoded into the fixed 10-feature frame, and is scored by
//! whatever [`classifier::Classifier`] implementation was injected at
//! startup. Storage and outbound alerts sit behind traits so the service
//! can be exercised entirely in memory.

pub mod batch;
pub mod classifier;
pub mod domain;
pub mod encoding;
pub mod intake;
pub mod model;
pub mod repository;
pub mod router;
pub mod service;

pub use batch::{score_export, BatchError, BatchFailure, BatchOutcome, BatchReport};
pub use classifier::{Classifier, ClassifierError, LoanDecision};
pub use domain::{
    ApplicantProfile, ApplicationId, CreditHistory, Education, Gender, LoanApplication,
    MaritalStatus, PropertyArea, ScreeningStatus, SelfEmployment, UnknownCategory,
};
pub use encoding::{encode, EncodingError, FeatureVector, FEATURE_COUNT};
pub use intake::IntakeError;
pub use model::{DecisionTree, ForestClassifier, ModelError, TreeNode, ARTIFACT_SCHEMA};
pub use repository::{
    AlertError, ApplicationRepository, ApplicationStatusView, DecisionAlert, DecisionPublisher,
    RepositoryError, ScreeningOutcome, ScreeningRecord,
};
pub use router::screening_router;
pub use service::{Prediction, ScreeningService, ScreeningServiceError};
