//! Integration specifications for the loan screening intake and decision
//! workflow.
//!
//! Scenarios drive the public service facade and HTTP router end-to-end so
//! intake validation, encoding, classification, and routing are exercised
//! without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use loan_ai::screening::{
        ApplicationId, ApplicationRepository, Classifier, ClassifierError, CreditHistory,
        DecisionAlert, DecisionPublisher, Education, FeatureVector, Gender, LoanApplication,
        MaritalStatus, PropertyArea, RepositoryError, ScreeningRecord, ScreeningService,
        SelfEmployment,
    };
    use loan_ai::screening::repository::AlertError;

    pub(super) fn application() -> LoanApplication {
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

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        records: Arc<Mutex<HashMap<ApplicationId, ScreeningRecord>>>,
    }

    impl ApplicationRepository for MemoryRepository {
        fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&record.profile.application_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.profile.application_id.clone(), record.clone());
            Ok(record)
        }

        fn update(&self, record: ScreeningRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(record.profile.application_id.clone(), record);
            Ok(())
        }

        fn fetch(&self, id: &ApplicationId) -> Result<Option<ScreeningRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }

        fn pending(&self, _limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryAlerts {
        events: Arc<Mutex<Vec<DecisionAlert>>>,
    }

    impl MemoryAlerts {
        pub(super) fn events(&self) -> Vec<DecisionAlert> {
            self.events.lock().expect("lock").clone()
        }
    }

    impl DecisionPublisher for MemoryAlerts {
        fn publish(&self, alert: DecisionAlert) -> Result<(), AlertError> {
            self.events.lock().expect("lock").push(alert);
            Ok(())
        }
    }

    pub(super) struct StubClassifier(pub(super) u8);

    impl Classifier for StubClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<u8, ClassifierError> {
            Ok(self.0)
        }
    }

    pub(super) struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<u8, ClassifierError> {
            Err(ClassifierError::Unavailable(
                "artifact backend offline".to_string(),
            ))
        }
    }

    pub(super) fn build_service(
        classifier: Arc<dyn Classifier>,
    ) -> (
        ScreeningService<MemoryRepository, MemoryAlerts>,
        Arc<MemoryRepository>,
        Arc<MemoryAlerts>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        let alerts = Arc::new(MemoryAlerts::default());
        let service = ScreeningService::new(repository.clone(), alerts.clone(), classifier);
        (service, repository, alerts)
    }

    pub(super) use MemoryAlerts as Alerts;
    pub(super) use MemoryRepository as Repository;
}

mod intake {
    use std::sync::Arc;

    use super::common::*;
    use loan_ai::screening::{IntakeError, ScreeningServiceError, ScreeningStatus};

    #[test]
    fn submission_is_stored_with_submitted_status() {
        let (service, repository, _) = build_service(Arc::new(StubClassifier(1)));
        let record = service.submit(application()).expect("submission succeeds");

        assert_eq!(record.status, ScreeningStatus::Submitted);
        assert!(record.outcome.is_none());
        assert_eq!(record.profile.combined_income, 5000.0);
        assert!(record.profile.application_id.0.starts_with("loan-"));

        let stored = loan_ai::screening::ApplicationRepository::fetch(
            repository.as_ref(),
            &record.profile.application_id,
        )
        .expect("repo fetch")
        .expect("record present");
        assert_eq!(stored.status, ScreeningStatus::Submitted);
    }

    #[test]
    fn non_finite_numerics_are_rejected_at_intake() {
        let (service, _, _) = build_service(Arc::new(StubClassifier(1)));
        let mut bad = application();
        bad.loan_amount_term = f64::NAN;

        match service.submit(bad) {
            Err(ScreeningServiceError::Intake(IntakeError::NonFiniteField { field })) => {
                assert_eq!(field, "Loan_Amount_Term");
            }
            other => panic!("expected intake rejection, got {other:?}"),
        }
    }

    #[test]
    fn negative_incomes_are_rejected_at_intake() {
        let (service, _, _) = build_service(Arc::new(StubClassifier(1)));
        let mut bad = application();
        bad.applicant_income = -250.0;

        assert!(matches!(
            service.submit(bad),
            Err(ScreeningServiceError::Intake(IntakeError::NegativeField {
                field: "ApplicantIncome",
                ..
            }))
        ));
    }
}

mod evaluation {
    use std::sync::Arc;

    use super::common::*;
    use loan_ai::screening::{
        ApplicationRepository, EncodingError, LoanDecision, ScreeningServiceError, ScreeningStatus,
    };

    #[test]
    fn approving_signal_persists_and_publishes() {
        let (service, repository, alerts) = build_service(Arc::new(StubClassifier(1)));
        let record = service.submit(application()).expect("submission");
        let outcome = service
            .evaluate(&record.profile.application_id)
            .expect("evaluation");

        assert_eq!(outcome.decision, LoanDecision::Approved);
        assert_eq!(outcome.signal, 1);
        assert_eq!(outcome.features.as_slice().len(), 10);
        assert_eq!(outcome.features.as_slice()[9], 5000.0_f64.ln());

        let stored = repository
            .fetch(&record.profile.application_id)
            .expect("repo fetch")
            .expect("record present");
        assert_eq!(stored.status, ScreeningStatus::Approved);
        assert!(stored.outcome.is_some());

        let events = alerts.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].template, "loan_approved");
        assert_eq!(events[0].application_id, record.profile.application_id);
    }

    #[test]
    fn rejecting_signal_persists_without_alerts() {
        let (service, repository, alerts) = build_service(Arc::new(StubClassifier(0)));
        let record = service.submit(application()).expect("submission");
        let outcome = service
            .evaluate(&record.profile.application_id)
            .expect("evaluation");

        assert_eq!(outcome.decision, LoanDecision::Rejected);

        let stored = repository
            .fetch(&record.profile.application_id)
            .expect("repo fetch")
            .expect("record present");
        assert_eq!(stored.status, ScreeningStatus::Rejected);
        assert!(alerts.events().is_empty());
    }

    #[test]
    fn zero_income_application_fails_with_computation_error() {
        let (service, _, alerts) = build_service(Arc::new(StubClassifier(1)));
        let mut zero_income = application();
        zero_income.applicant_income = 0.0;
        zero_income.coapplicant_income = 0.0;

        let record = service.submit(zero_income).expect("intake accepts zeros");
        match service.evaluate(&record.profile.application_id) {
            Err(ScreeningServiceError::Encoding(EncodingError::NonPositiveIncome {
                combined,
            })) => assert_eq!(combined, 0.0),
            other => panic!("expected encoding failure, got {other:?}"),
        }
        assert!(alerts.events().is_empty());
    }

    #[test]
    fn classifier_outage_is_surfaced_not_swallowed() {
        let (service, _, _) = build_service(Arc::new(FailingClassifier));
        let record = service.submit(application()).expect("submission");

        assert!(matches!(
            service.evaluate(&record.profile.application_id),
            Err(ScreeningServiceError::Classifier(_))
        ));
    }

    #[test]
    fn stateless_predict_does_not_touch_the_repository() {
        let (service, repository, _) = build_service(Arc::new(StubClassifier(1)));
        let prediction = service.predict(application()).expect("prediction");

        assert_eq!(prediction.decision, LoanDecision::Approved);
        assert_eq!(
            prediction.features.as_slice(),
            &[1.0, 1.0, 2.0, 0.0, 0.0, 150.0, 360.0, 1.0, 2.0, 5000.0_f64.ln()]
        );
        assert!(repository.pending(10).expect("pending").is_empty());
    }
}

mod routing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::common::*;
    use loan_ai::screening::{screening_router, Classifier, ScreeningService};

    fn build_router(classifier: Arc<dyn Classifier>) -> (axum::Router, Arc<Repository>) {
        let repository = Arc::new(Repository::default());
        let alerts = Arc::new(Alerts::default());
        let service = Arc::new(ScreeningService::new(
            repository.clone(),
            alerts,
            classifier,
        ));
        (screening_router(service), repository)
    }

    fn json_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn post_applications_returns_tracking_id() {
        let (router, _) = build_router(Arc::new(StubClassifier(1)));
        let body = serde_json::to_vec(&application()).expect("serialize application");

        let response = router
            .oneshot(json_request("POST", "/api/v1/loans/applications", body))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload
            .get("application_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .starts_with("loan-"));
        assert_eq!(
            payload.get("status").and_then(Value::as_str),
            Some("submitted"),
        );
        assert!(payload
            .get("decision_rationale")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("pending"));
    }

    #[tokio::test]
    async fn decision_endpoint_scores_a_stored_application() {
        let (router, _) = build_router(Arc::new(StubClassifier(1)));
        let body = serde_json::to_vec(&application()).expect("serialize application");

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/v1/loans/applications", body))
            .await
            .expect("router dispatch");
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let submitted: Value = serde_json::from_slice(&body).expect("json");
        let id = submitted
            .get("application_id")
            .and_then(Value::as_str)
            .expect("id")
            .to_string();

        let response = router
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/loans/applications/{id}/decision"),
                Vec::new(),
            ))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let outcome: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            outcome.get("decision").and_then(Value::as_str),
            Some("Approved")
        );
        assert_eq!(outcome.get("signal").and_then(Value::as_u64), Some(1));
        assert_eq!(
            outcome
                .get("features")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(10)
        );
    }

    #[tokio::test]
    async fn predictions_endpoint_is_stateless() {
        let (router, repository) = build_router(Arc::new(StubClassifier(0)));
        let body = serde_json::to_vec(&application()).expect("serialize application");

        let response = router
            .oneshot(json_request("POST", "/api/v1/loans/predictions", body))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("decision").and_then(Value::as_str),
            Some("Rejected")
        );

        assert!(loan_ai::screening::ApplicationRepository::pending(repository.as_ref(), 10)
            .expect("pending")
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_categorical_labels_are_rejected_by_the_json_boundary() {
        let (router, _) = build_router(Arc::new(StubClassifier(1)));
        let mut payload = serde_json::to_value(&application()).expect("serialize");
        payload["property_area"] = Value::String("Suburban".to_string());
        let body = serde_json::to_vec(&payload).expect("serialize");

        let response = router
            .oneshot(json_request("POST", "/api/v1/loans/predictions", body))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_application_id_is_a_404() {
        let (router, _) = build_router(Arc::new(StubClassifier(1)));

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/loans/applications/loan-999999")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload.get("error").is_some());
    }

    #[tokio::test]
    async fn classifier_outage_maps_to_service_unavailable() {
        let (router, _) = build_router(Arc::new(FailingClassifier));
        let body = serde_json::to_vec(&application()).expect("serialize application");

        let response = router
            .oneshot(json_request("POST", "/api/v1/loans/predictions", body))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn get_returns_the_scored_status_view() {
        let (router, _) = build_router(Arc::new(StubClassifier(1)));
        let body = serde_json::to_vec(&application()).expect("serialize application");

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/v1/loans/applications", body))
            .await
            .expect("router dispatch");
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let submitted: Value = serde_json::from_slice(&body).expect("json");
        let id = submitted
            .get("application_id")
            .and_then(Value::as_str)
            .expect("id")
            .to_string();

        router
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/loans/applications/{id}/decision"),
                Vec::new(),
            ))
            .await
            .expect("router dispatch");

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/loans/applications/{id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("status").and_then(Value::as_str),
            Some("approved")
        );
        assert_eq!(
            payload.get("decision").and_then(Value::as_str),
            Some("Approved")
        );
    }
}
