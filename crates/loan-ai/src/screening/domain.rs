use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for screened loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Raised when a categorical field carries a label outside its declared set.
///
/// Unknown labels are rejected outright; nothing falls through to a default
/// category, because the classifier was trained on the exact label set below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
}

/// Applicant gender as collected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(UnknownCategory {
                field: "Gender",
                value: other.to_string(),
            }),
        }
    }
}

/// Marital status; the form collects it as a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "Yes")]
    Married,
    #[serde(rename = "No")]
    Single,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MaritalStatus::Married => "Yes",
            MaritalStatus::Single => "No",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Yes" => Ok(MaritalStatus::Married),
            "No" => Ok(MaritalStatus::Single),
            other => Err(UnknownCategory {
                field: "Married",
                value: other.to_string(),
            }),
        }
    }
}

/// Highest education level declared by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    Graduate,
    #[serde(rename = "Not Graduate")]
    NotGraduate,
}

impl Education {
    pub const fn label(self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::NotGraduate => "Not Graduate",
        }
    }
}

impl FromStr for Education {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Graduate" => Ok(Education::Graduate),
            "Not Graduate" => Ok(Education::NotGraduate),
            other => Err(UnknownCategory {
                field: "Education",
                value: other.to_string(),
            }),
        }
    }
}

/// Employment arrangement; self-employed applicants are flagged separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfEmployment {
    #[serde(rename = "Yes")]
    SelfEmployed,
    #[serde(rename = "No")]
    Salaried,
}

impl SelfEmployment {
    pub const fn label(self) -> &'static str {
        match self {
            SelfEmployment::SelfEmployed => "Yes",
            SelfEmployment::Salaried => "No",
        }
    }
}

impl FromStr for SelfEmployment {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Yes" => Ok(SelfEmployment::SelfEmployed),
            "No" => Ok(SelfEmployment::Salaried),
            other => Err(UnknownCategory {
                field: "Self_Employed",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether the applicant currently services another loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditHistory {
    #[serde(rename = "Outstanding Loan")]
    OutstandingLoan,
    #[serde(rename = "No Outstanding Loan")]
    NoOutstandingLoan,
}

impl CreditHistory {
    pub const fn label(self) -> &'static str {
        match self {
            CreditHistory::OutstandingLoan => "Outstanding Loan",
            CreditHistory::NoOutstandingLoan => "No Outstanding Loan",
        }
    }
}

impl FromStr for CreditHistory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Outstanding Loan" => Ok(CreditHistory::OutstandingLoan),
            "No Outstanding Loan" => Ok(CreditHistory::NoOutstandingLoan),
            other => Err(UnknownCategory {
                field: "Credit_History",
                value: other.to_string(),
            }),
        }
    }
}

/// Area classification of the property backing the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyArea {
    Rural,
    Urban,
    #[serde(rename = "Semi Urban")]
    SemiUrban,
}

impl PropertyArea {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyArea::Rural => "Rural",
            PropertyArea::Urban => "Urban",
            PropertyArea::SemiUrban => "Semi Urban",
        }
    }
}

impl FromStr for PropertyArea {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Rural" => Ok(PropertyArea::Rural),
            "Urban" => Ok(PropertyArea::Urban),
            "Semi Urban" => Ok(PropertyArea::SemiUrban),
            other => Err(UnknownCategory {
                field: "Property_Area",
                value: other.to_string(),
            }),
        }
    }
}

/// The eleven raw form fields as submitted by the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub gender: Gender,
    pub married: MaritalStatus,
    pub dependents: f64,
    pub education: Education,
    pub self_employed: SelfEmployment,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit_history: CreditHistory,
    pub property_area: PropertyArea,
}

impl LoanApplication {
    /// Combined household income backing the derived log-income feature.
    pub fn combined_income(&self) -> f64 {
        self.applicant_income + self.coapplicant_income
    }
}

/// The validated application after intake checks, ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub application_id: ApplicationId,
    pub application: LoanApplication,
    pub combined_income: f64,
}

/// High level status tracked throughout the screening workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningStatus {
    Submitted,
    Approved,
    Rejected,
}

impl ScreeningStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningStatus::Submitted => "submitted",
            ScreeningStatus::Approved => "approved",
            ScreeningStatus::Rejected => "rejected",
        }
    }
}
