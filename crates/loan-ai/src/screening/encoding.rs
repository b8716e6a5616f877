//! Categorical-to-numeric encoding for the classifier's training schema.
//!
//! The mapping and the feature order are part of the model contract: the
//! classifier artifact was fitted against exactly this frame, so any change
//! here invalidates every deployed artifact.

use serde::{Deserialize, Serialize};

use super::domain::{
    CreditHistory, Education, Gender, LoanApplication, MaritalStatus, PropertyArea, SelfEmployment,
};

/// Width of the encoded frame the classifier consumes.
pub const FEATURE_COUNT: usize = 10;

/// Ordered numeric features derived from one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> [f64; FEATURE_COUNT] {
        self.0
    }
}

/// Failures while deriving features from otherwise well-typed input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error(
        "combined income must be positive to derive the log-income feature (got {combined})"
    )]
    NonPositiveIncome { combined: f64 },
}

const fn gender_code(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 1.0,
        Gender::Female => 0.0,
    }
}

const fn marital_code(status: MaritalStatus) -> f64 {
    match status {
        MaritalStatus::Married => 1.0,
        MaritalStatus::Single => 0.0,
    }
}

// Graduate encodes to 0, the inverse of the other yes/no flags. Inherited
// from the dataset the artifact was fitted on.
const fn education_code(education: Education) -> f64 {
    match education {
        Education::Graduate => 0.0,
        Education::NotGraduate => 1.0,
    }
}

const fn employment_code(employment: SelfEmployment) -> f64 {
    match employment {
        SelfEmployment::SelfEmployed => 1.0,
        SelfEmployment::Salaried => 0.0,
    }
}

const fn credit_code(history: CreditHistory) -> f64 {
    match history {
        CreditHistory::OutstandingLoan => 1.0,
        CreditHistory::NoOutstandingLoan => 0.0,
    }
}

const fn area_code(area: PropertyArea) -> f64 {
    match area {
        PropertyArea::Rural => 0.0,
        PropertyArea::SemiUrban => 1.0,
        PropertyArea::Urban => 2.0,
    }
}

/// Assemble the fixed-order feature vector for one application.
///
/// The raw incomes never appear individually; the frame carries only their
/// natural-log sum, which is undefined for a non-positive combined income.
pub fn encode(application: &LoanApplication) -> Result<FeatureVector, EncodingError> {
    let combined = application.combined_income();
    if !combined.is_finite() || combined <= 0.0 {
        return Err(EncodingError::NonPositiveIncome { combined });
    }

    Ok(FeatureVector([
        gender_code(application.gender),
        marital_code(application.married),
        application.dependents,
        education_code(application.education),
        employment_code(application.self_employed),
        application.loan_amount,
        application.loan_amount_term,
        credit_code(application.credit_history),
        area_code(application.property_area),
        combined.ln(),
    ]))
}
