use super::domain::{ApplicantProfile, ApplicationId, LoanApplication};

/// Validation errors raised while admitting a raw submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("{field} must be a finite number")]
    NonFiniteField { field: &'static str },
    #[error("{field} must be non-negative (got {value})")]
    NegativeField { field: &'static str, value: f64 },
}

pub(crate) const PENDING_APPLICATION_ID: &str = "pending";

/// Convert an inbound submission into a validated applicant profile.
///
/// Categorical fields are already typed by the time a `LoanApplication`
/// exists; intake is responsible for the numeric invariants the type system
/// cannot express.
pub fn validated_profile(application: LoanApplication) -> Result<ApplicantProfile, IntakeError> {
    let numeric_fields = [
        ("Dependents", application.dependents),
        ("ApplicantIncome", application.applicant_income),
        ("CoapplicantIncome", application.coapplicant_income),
        ("LoanAmount", application.loan_amount),
        ("Loan_Amount_Term", application.loan_amount_term),
    ];

    for (field, value) in numeric_fields {
        if !value.is_finite() {
            return Err(IntakeError::NonFiniteField { field });
        }
        if value < 0.0 {
            return Err(IntakeError::NegativeField { field, value });
        }
    }

    let combined_income = application.combined_income();

    Ok(ApplicantProfile {
        application_id: ApplicationId(PENDING_APPLICATION_ID.to_string()),
        application,
        combined_income,
    })
}
