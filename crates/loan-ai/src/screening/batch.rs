//! Batch scoring of CSV application exports.
//!
//! Exports use the upstream column headers (`Gender`, `Married`, ...,
//! `Property_Area`) with an optional `Loan_ID`. Rows parse through the same
//! tagged enums and intake validation as the HTTP surface; a bad row is
//! reported with its record number and skipped, it never aborts the rest of
//! the export.

use std::io::Read;

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, LoanDecision};
use super::domain::{LoanApplication, UnknownCategory};
use super::encoding;
use super::intake;

/// Failures that make the export as a whole unreadable.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read application export: {0}")]
    Csv(#[from] csv::Error),
}

/// Decision for one successfully scored row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// 1-based record number, header row excluded.
    pub record: u64,
    pub loan_id: Option<String>,
    pub decision: LoanDecision,
}

/// A row that could not be scored, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub record: u64,
    pub loan_id: Option<String>,
    pub reason: String,
}

/// Aggregated results for one export.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn scored(&self) -> usize {
        self.outcomes.len()
    }

    pub fn approved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.decision.is_approved())
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.scored() - self.approved()
    }
}

/// Score every row of a CSV export against the supplied classifier.
pub fn score_export<S: Read>(
    reader: S,
    classifier: &dyn Classifier,
) -> Result<BatchReport, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = BatchReport::default();

    for (index, row) in csv_reader.deserialize::<ExportRow>().enumerate() {
        let record = index as u64 + 1;

        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(BatchError::Csv(err)),
            Err(err) => {
                report.failures.push(BatchFailure {
                    record,
                    loan_id: None,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let loan_id = row.loan_id.clone();
        let application = match row.into_application() {
            Ok(application) => application,
            Err(reason) => {
                report.failures.push(BatchFailure {
                    record,
                    loan_id,
                    reason,
                });
                continue;
            }
        };

        let scored = intake::validated_profile(application)
            .map_err(|err| err.to_string())
            .and_then(|profile| {
                encoding::encode(&profile.application).map_err(|err| err.to_string())
            })
            .and_then(|features| classifier.predict(&features).map_err(|err| err.to_string()));

        match scored {
            Ok(signal) => report.outcomes.push(BatchOutcome {
                record,
                loan_id,
                decision: LoanDecision::from_signal(signal),
            }),
            Err(reason) => report.failures.push(BatchFailure {
                record,
                loan_id,
                reason,
            }),
        }
    }

    Ok(report)
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Loan_ID", default)]
    loan_id: Option<String>,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Married")]
    married: String,
    #[serde(rename = "Dependents")]
    dependents: String,
    #[serde(rename = "Education")]
    education: String,
    #[serde(rename = "Self_Employed")]
    self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    applicant_income: String,
    #[serde(rename = "CoapplicantIncome")]
    coapplicant_income: String,
    #[serde(rename = "LoanAmount")]
    loan_amount: String,
    #[serde(rename = "Loan_Amount_Term")]
    loan_amount_term: String,
    #[serde(rename = "Credit_History")]
    credit_history: String,
    #[serde(rename = "Property_Area")]
    property_area: String,
}

impl ExportRow {
    fn into_application(self) -> Result<LoanApplication, String> {
        let category = |err: UnknownCategory| err.to_string();

        Ok(LoanApplication {
            gender: self.gender.parse().map_err(category)?,
            married: self.married.parse().map_err(category)?,
            dependents: parse_number("Dependents", &self.dependents)?,
            education: self.education.parse().map_err(category)?,
            self_employed: self.self_employed.parse().map_err(category)?,
            applicant_income: parse_number("ApplicantIncome", &self.applicant_income)?,
            coapplicant_income: parse_number("CoapplicantIncome", &self.coapplicant_income)?,
            loan_amount: parse_number("LoanAmount", &self.loan_amount)?,
            loan_amount_term: parse_number("Loan_Amount_Term", &self.loan_amount_term)?,
            credit_history: self.credit_history.parse().map_err(category)?,
            property_area: self.property_area.parse().map_err(category)?,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{field} must be numeric (got '{raw}')"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::classifier::ClassifierError;
    use crate::screening::encoding::FeatureVector;

    struct StubClassifier(u8);

    impl Classifier for StubClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<u8, ClassifierError> {
            Ok(self.0)
        }
    }

    const HEADER: &str = "Loan_ID,Gender,Married,Dependents,Education,Self_Employed,\
ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area\n";

    #[test]
    fn well_formed_rows_are_scored_in_order() {
        let export = format!(
            "{HEADER}\
LP001,Male,Yes,2,Graduate,No,5000,0,150,360,Outstanding Loan,Urban\n\
LP002,Female,No,0,Not Graduate,Yes,2600,1800,95,180,No Outstanding Loan,Rural\n"
        );

        let report =
            score_export(export.as_bytes(), &StubClassifier(1)).expect("export parses");

        assert_eq!(report.scored(), 2);
        assert_eq!(report.approved(), 2);
        assert_eq!(report.rejected(), 0);
        assert!(report.failures.is_empty());
        assert_eq!(report.outcomes[0].record, 1);
        assert_eq!(report.outcomes[0].loan_id.as_deref(), Some("LP001"));
        assert_eq!(report.outcomes[1].loan_id.as_deref(), Some("LP002"));
    }

    #[test]
    fn bad_rows_are_reported_without_aborting_the_export() {
        let export = format!(
            "{HEADER}\
LP001,Martian,Yes,2,Graduate,No,5000,0,150,360,Outstanding Loan,Urban\n\
LP002,Male,Yes,two,Graduate,No,5000,0,150,360,Outstanding Loan,Urban\n\
LP003,Male,Yes,0,Graduate,No,0,0,150,360,Outstanding Loan,Urban\n\
LP004,Female,No,1,Graduate,No,4100,0,88,360,Outstanding Loan,Semi Urban\n"
        );

        let report =
            score_export(export.as_bytes(), &StubClassifier(0)).expect("export parses");

        assert_eq!(report.scored(), 1);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.outcomes[0].record, 4);

        assert_eq!(report.failures.len(), 3);
        assert!(report.failures[0].reason.contains("unknown Gender value 'Martian'"));
        assert!(report.failures[1].reason.contains("Dependents must be numeric"));
        assert!(report.failures[2].reason.contains("combined income"));
        assert_eq!(report.failures[2].loan_id.as_deref(), Some("LP003"));
    }

    #[test]
    fn short_rows_fail_individually() {
        let export = format!(
            "{HEADER}\
LP001,Male,Yes,2,Graduate,No\n\
LP002,Male,Yes,2,Graduate,No,5000,0,150,360,Outstanding Loan,Urban\n"
        );

        let report =
            score_export(export.as_bytes(), &StubClassifier(1)).expect("export parses");

        assert_eq!(report.scored(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].record, 1);
        assert_eq!(report.outcomes[0].record, 2);
    }
}
