use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::tree::{RegressionTree, TreeParams};
use crate::classifier::{check_labels, Classifier, ClassifierError};
use crate::features::FeatureMatrix;

/// Keeps the prior log-odds finite when the training set has a single class.
const PRIOR_CLIP: f64 = 1e-15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedModel {
    n_features: usize,
    /// Log-odds of the positive rate seen at fit time.
    init_score: f64,
    trees: Vec<RegressionTree>,
}

/// Binary log-loss gradient boosting over regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    params: BoostingParams,
    #[serde(default)]
    state: Option<FittedModel>,
}

impl GradientBoostingClassifier {
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            state: None,
        }
    }

    /// Row width the model was fitted on.
    pub fn n_features(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_features)
    }

    /// Largest feature index any stage splits on.
    pub fn max_feature(&self) -> Option<usize> {
        self.state
            .as_ref()?
            .trees
            .iter()
            .filter_map(RegressionTree::max_feature)
            .max()
    }

    fn raw_score(&self, model: &FittedModel, row: &[f64]) -> f64 {
        model.init_score
            + model
                .trees
                .iter()
                .map(|tree| self.params.learning_rate * tree.predict(row))
                .sum::<f64>()
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new(BoostingParams::default())
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, features: &FeatureMatrix, labels: &[u8]) -> Result<(), ClassifierError> {
        check_labels(features, labels)?;
        if features.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        let rows = features.rows();
        let targets: Vec<f64> = labels.iter().map(|&y| f64::from(y)).collect();
        let positive_rate = (targets.iter().sum::<f64>() / targets.len() as f64)
            .clamp(PRIOR_CLIP, 1.0 - PRIOR_CLIP);
        let init_score = (positive_rate / (1.0 - positive_rate)).ln();

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
        };
        let mut scores = vec![init_score; rows.len()];
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let probabilities: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let gradients: Vec<f64> = targets
                .iter()
                .zip(&probabilities)
                .map(|(y, p)| y - p)
                .collect();
            let hessians: Vec<f64> = probabilities.iter().map(|p| p * (1.0 - p)).collect();

            let tree = RegressionTree::fit(rows, &gradients, &hessians, tree_params);
            for (score, row) in scores.iter_mut().zip(rows) {
                *score += self.params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        debug!(
            rows = rows.len(),
            width = features.width(),
            stages = trees.len(),
            "Gradient boosting fitted"
        );
        self.state = Some(FittedModel {
            n_features: features.width(),
            init_score,
            trees,
        });
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        let model = self.state.as_ref().ok_or(ClassifierError::NotFitted)?;
        if features.width() != model.n_features {
            return Err(ClassifierError::WidthMismatch {
                expected: model.n_features,
                found: features.width(),
            });
        }
        Ok(features
            .rows()
            .iter()
            .map(|row| sigmoid(self.raw_score(model, row)))
            .collect())
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn matrix(columns: &[&str], rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        FeatureMatrix::from_rows(columns, rows).unwrap()
    }

    /// y = 1 iff x0 >= 10; x1 is noise.
    fn separable() -> (FeatureMatrix, Vec<u8>) {
        let rows = (0..20).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let labels = (0..20).map(|i| u8::from(i >= 10)).collect();
        (matrix(&["x0", "x1"], rows), labels)
    }

    #[test]
    fn test_learns_separable_problem() {
        let (x, y) = separable();
        let mut model = GradientBoostingClassifier::default();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
        let probabilities = model.predict_proba(&x).unwrap();
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probabilities[0] < 0.1);
        assert!(probabilities[19] > 0.9);
    }

    #[test]
    fn test_prior_only_model_predicts_positive_rate() {
        let (x, y) = separable();
        let mut model = GradientBoostingClassifier::new(BoostingParams {
            n_estimators: 0,
            ..BoostingParams::default()
        });
        model.fit(&x, &y).unwrap();

        for p in model.predict_proba(&x).unwrap() {
            assert!((p - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_class_training_stays_finite() {
        let x = matrix(&["x"], vec![vec![0.0], vec![1.0], vec![2.0]]);
        let mut model = GradientBoostingClassifier::default();
        model.fit(&x, &[1, 1, 1]).unwrap();

        let probabilities = model.predict_proba(&x).unwrap();
        assert!(probabilities.iter().all(|p| p.is_finite() && *p > 0.99));
    }

    #[test]
    fn test_max_feature_spans_all_stages() {
        let (x, y) = separable();
        let mut model = GradientBoostingClassifier::default();
        assert_eq!(model.max_feature(), None);

        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_features(), Some(2));
        assert!(matches!(model.max_feature(), Some(f) if f < x.width()));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (x, _) = separable();
        assert!(matches!(
            GradientBoostingClassifier::default().predict_proba(&x),
            Err(ClassifierError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_on_empty_matrix_fails() {
        let x = matrix(&["x"], vec![]);
        assert!(matches!(
            GradientBoostingClassifier::default().fit(&x, &[]),
            Err(ClassifierError::EmptyDataset)
        ));
    }

    #[test]
    fn test_width_mismatch_detected() {
        let (x, y) = separable();
        let mut model = GradientBoostingClassifier::default();
        model.fit(&x, &y).unwrap();

        let narrow = matrix(&["x0"], vec![vec![3.0]]);
        assert!(matches!(
            model.predict_proba(&narrow),
            Err(ClassifierError::WidthMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = separable();
        let mut model = GradientBoostingClassifier::new(BoostingParams {
            n_estimators: 10,
            ..BoostingParams::default()
        });
        model.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: GradientBoostingClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.n_features(), Some(2));
        let before = model.predict_proba(&x).unwrap();
        let after = restored.predict_proba(&x).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
