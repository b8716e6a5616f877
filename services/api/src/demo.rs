use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::infra::{demo_classifier, InMemoryApplicationRepository, InMemoryDecisionPublisher};
use loan_ai::config::AppConfig;
use loan_ai::error::AppError;
use loan_ai::screening::{
    score_export, ApplicationRepository, Classifier, CreditHistory, Education, ForestClassifier,
    Gender, LoanApplication, MaritalStatus, PropertyArea, ScreeningService, SelfEmployment,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also score a weak-profile application expected to be rejected
    #[arg(long)]
    pub(crate) include_rejection: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to the CSV application export to score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let artifact_path = args.model.unwrap_or(config.model.artifact_path);
    let classifier = ForestClassifier::from_path(&artifact_path)?;

    let file = File::open(&args.csv)?;
    let report = score_export(BufReader::new(file), &classifier)?;

    println!(
        "Scored {} application(s) from {}",
        report.scored(),
        args.csv.display()
    );
    println!("- approved: {}", report.approved());
    println!("- rejected: {}", report.rejected());

    for outcome in &report.outcomes {
        println!(
            "  record {:>4} | {} | {}",
            outcome.record,
            outcome.loan_id.as_deref().unwrap_or("-"),
            outcome.decision.label()
        );
    }

    if report.failures.is_empty() {
        println!("Failures: none");
    } else {
        println!("Failures:");
        for failure in &report.failures {
            println!(
                "  record {:>4} | {} | {}",
                failure.record,
                failure.loan_id.as_deref().unwrap_or("-"),
                failure.reason
            );
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Loan screening demo");

    let classifier: Arc<dyn Classifier> = Arc::new(demo_classifier());
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let alerts = Arc::new(InMemoryDecisionPublisher::default());
    let service = ScreeningService::new(repository.clone(), alerts.clone(), classifier);

    let record = match service.submit(sample_application()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    let public_view = record.status_view();
    println!(
        "- Received application {} -> status {}",
        public_view.application_id.0, public_view.status
    );

    let outcome = match service.evaluate(&record.profile.application_id) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Evaluation unavailable: {}", err);
            return Ok(());
        }
    };
    println!(
        "  Decision: {} (classifier signal {})",
        outcome.decision.label(),
        outcome.signal
    );
    println!("  Feature frame: {:?}", outcome.features.as_slice());

    let stored_view = match repository.fetch(&record.profile.application_id) {
        Ok(Some(record)) => record.status_view(),
        Ok(None) => {
            println!("  Repository lookup returned no record");
            return Ok(());
        }
        Err(err) => {
            println!("  Repository unavailable: {}", err);
            return Ok(());
        }
    };
    match serde_json::to_string_pretty(&stored_view) {
        Ok(json) => println!("  Public status payload:\n{}", json),
        Err(err) => println!("  Public status payload unavailable: {}", err),
    }

    let events = alerts.events();
    if events.is_empty() {
        println!("  Decision alerts: none dispatched");
    } else {
        println!("  Decision alerts:");
        for alert in events {
            println!(
                "    - template={} -> {}",
                alert.template, alert.application_id.0
            );
        }
    }

    if args.include_rejection {
        println!("\nWeak-profile prediction");
        match service.predict(weak_application()) {
            Ok(prediction) => println!(
                "  Decision: {} (classifier signal {})",
                prediction.decision.label(),
                prediction.signal
            ),
            Err(err) => println!("  Prediction unavailable: {}", err),
        }
    }

    Ok(())
}

fn sample_application() -> LoanApplication {
    LoanApplication {
        gender: Gender::Male,
        married: MaritalStatus::Married,
        dependents: 2.0,
        education: Education::Graduate,
        self_employed: SelfEmployment::Salaried,
        applicant_income: 5000.0,
        coapplicant_income: 0.0,
        loan_amount: 150.0,
        loan_amount_term: 360.0,
        credit_history: CreditHistory::OutstandingLoan,
        property_area: PropertyArea::Urban,
    }
}

fn weak_application() -> LoanApplication {
    LoanApplication {
        gender: Gender::Female,
        married: MaritalStatus::Single,
        dependents: 0.0,
        education: Education::NotGraduate,
        self_employed: SelfEmployment::SelfEmployed,
        applicant_income: 900.0,
        coapplicant_income: 0.0,
        loan_amount: 120.0,
        loan_amount_term: 360.0,
        credit_history: CreditHistory::NoOutstandingLoan,
        property_area: PropertyArea::Rural,
    }
}
