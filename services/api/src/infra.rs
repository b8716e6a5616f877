use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use loan_ai::screening::repository::AlertError;
use loan_ai::screening::{
    ApplicationId, ApplicationRepository, DecisionAlert, DecisionPublisher, DecisionTree,
    ForestClassifier, RepositoryError, ScreeningRecord, ScreeningStatus, TreeNode,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ScreeningRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.profile.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.profile.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ScreeningRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.profile.application_id) {
            guard.insert(record.profile.application_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ScreeningRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == ScreeningStatus::Submitted)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDecisionPublisher {
    events: Arc<Mutex<Vec<DecisionAlert>>>,
}

impl DecisionPublisher for InMemoryDecisionPublisher {
    fn publish(&self, alert: DecisionAlert) -> Result<(), AlertError> {
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryDecisionPublisher {
    pub(crate) fn events(&self) -> Vec<DecisionAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

/// Hand-written stand-in for the trained artifact so the demo runs without
/// a provisioned model: one gate each on credit history (feature 7), log
/// income (feature 9), and requested amount (feature 5).
pub(crate) fn demo_classifier() -> ForestClassifier {
    let credit_gate = DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 7,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { vote: 0 },
            TreeNode::Leaf { vote: 1 },
        ],
    };
    let income_gate = DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 9,
                threshold: 7.6,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { vote: 0 },
            TreeNode::Leaf { vote: 1 },
        ],
    };
    let exposure_gate = DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 5,
                threshold: 400.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { vote: 1 },
            TreeNode::Leaf { vote: 0 },
        ],
    };

    ForestClassifier::from_trees(vec![credit_gate, income_gate, exposure_gate])
        .expect("demo forest is statically valid")
}
