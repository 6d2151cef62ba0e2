//! Binary classifier seam. The matcher and trainer only see `dyn Classifier`;
//! `GradientBoostingClassifier` is the backend shipped today.

pub mod gradient_boosting;
pub mod tree;

pub use gradient_boosting::{BoostingParams, GradientBoostingClassifier};

use thiserror::Error;

use crate::features::FeatureMatrix;

/// Scores at or above this are labelled a match.
pub const DECISION_THRESHOLD: f64 = 0.5;

pub fn label_for(score: f64) -> u8 {
    u8::from(score >= DECISION_THRESHOLD)
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier has not been fitted")]
    NotFitted,

    #[error("cannot fit on an empty training set")]
    EmptyDataset,

    #[error("expected {expected} labels, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },

    #[error("label must be 0 or 1, found {0}")]
    InvalidLabel(u8),

    #[error("row width {found} does not match fitted width {expected}")]
    WidthMismatch { expected: usize, found: usize },
}

pub trait Classifier: Send + Sync {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[u8]) -> Result<(), ClassifierError>;

    /// Positive-class probability per row, in row order.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError>;

    /// Accuracy of thresholded predictions against `labels`.
    fn score(&self, features: &FeatureMatrix, labels: &[u8]) -> Result<f64, ClassifierError> {
        check_labels(features, labels)?;
        if labels.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }
        let correct = self
            .predict_proba(features)?
            .into_iter()
            .zip(labels)
            .filter(|(p, y)| label_for(*p) == **y)
            .count();
        Ok(correct as f64 / labels.len() as f64)
    }
}

/// Labels must pair one-to-one with rows and be binary.
pub(crate) fn check_labels(features: &FeatureMatrix, labels: &[u8]) -> Result<(), ClassifierError> {
    if labels.len() != features.len() {
        return Err(ClassifierError::LabelCountMismatch {
            expected: features.len(),
            found: labels.len(),
        });
    }
    match labels.iter().find(|&&y| y > 1) {
        Some(&bad) => Err(ClassifierError::InvalidLabel(bad)),
        None => Ok(()),
    }
}
