//! Loading and evaluation of the pre-trained decision-forest artifact.
//!
//! The artifact is a JSON document produced by the offline training
//! pipeline. Loading is an explicit startup step returning an owned handle;
//! nothing here reaches the network, and the handle is immutable after load
//! so it can be shared freely across request handlers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError};
use super::encoding::{FeatureVector, FEATURE_COUNT};

/// Schema tag expected in the artifact header.
pub const ARTIFACT_SCHEMA: &str = "loan-forest/v1";

/// One node of a serialized decision tree. Children are indices into the
/// tree's node table and must point strictly forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        vote: u8,
    },
}

/// Flat node-table encoding of one tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ForestArtifact {
    schema: String,
    feature_count: usize,
    trees: Vec<DecisionTree>,
}

/// Failures while loading or validating the classifier artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact unreadable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported artifact schema '{found}' (expected '{expected}')")]
    UnsupportedSchema {
        expected: &'static str,
        found: String,
    },
    #[error("artifact frame width {found} does not match the {expected}-feature encoder")]
    FrameWidthMismatch { expected: usize, found: usize },
    #[error("artifact contains no trees")]
    EmptyForest,
    #[error("tree {tree} is invalid: {reason}")]
    InvalidTree { tree: usize, reason: String },
}

/// Owned, validated handle over the pre-trained ensemble.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Read and validate the artifact at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse and validate an artifact from any byte source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_reader(reader)?;

        if artifact.schema != ARTIFACT_SCHEMA {
            return Err(ModelError::UnsupportedSchema {
                expected: ARTIFACT_SCHEMA,
                found: artifact.schema,
            });
        }
        if artifact.feature_count != FEATURE_COUNT {
            return Err(ModelError::FrameWidthMismatch {
                expected: FEATURE_COUNT,
                found: artifact.feature_count,
            });
        }

        Self::from_trees(artifact.trees)
    }

    /// Build a classifier from in-memory trees, applying the same
    /// validation as artifact loading.
    pub fn from_trees(trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }

        for (index, tree) in trees.iter().enumerate() {
            validate_tree(index, tree)?;
        }

        Ok(Self { trees })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn tree_vote(tree: &DecisionTree, features: &[f64]) -> u8 {
        let mut cursor = 0;
        loop {
            match &tree.nodes[cursor] {
                // Child indices were validated strictly forward at load, so
                // this walk always terminates.
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    cursor = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { vote } => return *vote,
            }
        }
    }
}

impl Classifier for ForestClassifier {
    /// Majority vote across the ensemble. An even split rejects, the
    /// conservative outcome for a credit decision.
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError> {
        let values = features.as_slice();
        let approvals = self
            .trees
            .iter()
            .filter(|tree| Self::tree_vote(tree, values) != 0)
            .count();

        Ok(u8::from(approvals * 2 > self.trees.len()))
    }
}

fn validate_tree(index: usize, tree: &DecisionTree) -> Result<(), ModelError> {
    let invalid = |reason: String| ModelError::InvalidTree {
        tree: index,
        reason,
    };

    if tree.nodes.is_empty() {
        return Err(invalid("empty node table".to_string()));
    }

    for (position, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(invalid(format!(
                        "node {position} splits on feature {feature}, outside the frame"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!(
                        "node {position} has a non-finite threshold"
                    )));
                }
                for child in [*left, *right] {
                    if child <= position || child >= tree.nodes.len() {
                        return Err(invalid(format!(
                            "node {position} links to out-of-order child {child}"
                        )));
                    }
                }
            }
            TreeNode::Leaf { vote } => {
                if *vote > 1 {
                    return Err(invalid(format!(
                        "node {position} votes {vote}, expected 0 or 1"
                    )));
                }
            }
        }
    }

    Ok(())
}
