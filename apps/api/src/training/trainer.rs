use std::path::Path;

use tracing::info;

use crate::classifier::{Classifier, GradientBoostingClassifier};
use crate::config::TrainingConfig;
use crate::features::{FeatureMatrix, FeaturePipeline};
use crate::model_store::{ModelArtifact, ModelStore};
use crate::models::{records, LabeledExample};
use crate::training::{stratified_split, TrainingError};

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact: ModelArtifact,
    pub train_size: usize,
    pub holdout_size: usize,
    pub accuracy: f64,
}

/// Fits a classifier on rows produced by the same pipeline used for matching.
#[derive(Debug, Clone)]
pub struct Trainer {
    pipeline: FeaturePipeline,
    settings: TrainingConfig,
}

impl Trainer {
    pub fn new(pipeline: FeaturePipeline, settings: TrainingConfig) -> Self {
        Self { pipeline, settings }
    }

    /// One row per example, rows in corpus order, labels aligned to rows.
    pub fn build_training_set(
        &self,
        corpus: &[LabeledExample],
    ) -> Result<(FeatureMatrix, Vec<u8>), TrainingError> {
        if corpus.is_empty() {
            return Err(TrainingError::EmptyCorpus);
        }

        let mut matrix = FeatureMatrix::new(self.pipeline.columns().clone());
        let mut labels = Vec::with_capacity(corpus.len());
        for (index, example) in corpus.iter().enumerate() {
            if example.label > 1 {
                return Err(TrainingError::InvalidLabel {
                    index,
                    label: example.label,
                });
            }
            matrix.push(self.pipeline.features(&example.talent, &example.job)?)?;
            labels.push(example.label);
        }
        Ok((matrix, labels))
    }

    pub fn train(&self, corpus: &[LabeledExample]) -> Result<TrainingReport, TrainingError> {
        let (matrix, labels) = self.build_training_set(corpus)?;
        info!(examples = matrix.len(), width = matrix.width(), "Training set built");

        let split = stratified_split(&labels, self.settings.test_fraction, self.settings.seed)?;
        let pick = |indices: &[usize]| -> Vec<u8> { indices.iter().map(|&i| labels[i]).collect() };
        let (train_x, train_y) = (matrix.select(&split.train), pick(&split.train));
        let (holdout_x, holdout_y) = (matrix.select(&split.holdout), pick(&split.holdout));
        info!(
            train = train_x.len(),
            holdout = holdout_x.len(),
            "Split into training and holdout sets"
        );

        let mut classifier = GradientBoostingClassifier::new(self.settings.boosting_params());
        classifier.fit(&train_x, &train_y)?;
        let accuracy = classifier.score(&holdout_x, &holdout_y)?;
        info!(accuracy, "Accuracy measured on holdout set");

        Ok(TrainingReport {
            artifact: ModelArtifact::new(matrix.columns().to_vec(), accuracy, classifier),
            train_size: train_x.len(),
            holdout_size: holdout_x.len(),
            accuracy,
        })
    }

    /// Reads the corpus, trains off the async executor, and saves the artifact.
    pub async fn run(
        &self,
        corpus_path: &Path,
        store: &dyn ModelStore,
    ) -> Result<TrainingReport, TrainingError> {
        let corpus = load_corpus(corpus_path).await?;

        let trainer = self.clone();
        let report = tokio::task::spawn_blocking(move || trainer.train(&corpus))
            .await
            .map_err(|e| TrainingError::Aborted(e.to_string()))??;

        store.save(&report.artifact).await?;
        Ok(report)
    }
}

/// Reads a JSON array of `{talent, job, label}`.
pub async fn load_corpus(path: &Path) -> Result<Vec<LabeledExample>, TrainingError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| TrainingError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })?;
    let corpus: Vec<LabeledExample> = records::from_slice(&bytes)?;
    info!(examples = corpus.len(), "Loaded training corpus from {}", path.display());
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_store::FileModelStore;
    use crate::models::RecordError;
    use crate::test_support::{labeled_corpus, sample_pipeline};

    fn quick_trainer() -> Trainer {
        Trainer::new(
            sample_pipeline(),
            TrainingConfig {
                n_estimators: 20,
                ..TrainingConfig::default()
            },
        )
    }

    #[test]
    fn test_training_set_aligns_rows_with_labels() {
        let corpus = labeled_corpus(6);
        let (matrix, labels) = quick_trainer().build_training_set(&corpus).unwrap();

        assert_eq!(matrix.len(), 6);
        assert_eq!(labels, vec![1, 0, 1, 0, 1, 0]);
        let expected = sample_pipeline()
            .features(&corpus[3].talent, &corpus[3].job)
            .unwrap();
        assert_eq!(matrix.rows()[3], expected.values());
    }

    #[test]
    fn test_non_binary_label_rejected_with_index() {
        let mut corpus = labeled_corpus(4);
        corpus[2].label = 7;
        assert!(matches!(
            quick_trainer().build_training_set(&corpus),
            Err(TrainingError::InvalidLabel { index: 2, label: 7 })
        ));
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(matches!(
            quick_trainer().train(&[]),
            Err(TrainingError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_single_class_corpus_is_insufficient() {
        let corpus: Vec<_> = labeled_corpus(10)
            .into_iter()
            .filter(|e| e.label == 1)
            .collect();
        assert!(matches!(
            quick_trainer().train(&corpus),
            Err(TrainingError::InsufficientData { class: 0, .. })
        ));
    }

    #[test]
    fn test_train_reports_split_sizes_and_accuracy() {
        let report = quick_trainer().train(&labeled_corpus(20)).unwrap();

        assert_eq!(report.holdout_size, 4);
        assert_eq!(report.train_size, 16);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.artifact.holdout_accuracy, 1.0);
        assert_eq!(
            report.artifact.features,
            sample_pipeline().columns().to_vec()
        );
    }

    #[tokio::test]
    async fn test_run_reads_corpus_and_persists_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("data.json");
        std::fs::write(&corpus_path, serde_json::to_vec(&labeled_corpus(20)).unwrap()).unwrap();
        let store = FileModelStore::new(dir.path().join("model/model.json"));

        let report = quick_trainer().run(&corpus_path, &store).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.id, report.artifact.id);
        loaded
            .ensure_features(sample_pipeline().columns())
            .unwrap();
    }

    #[tokio::test]
    async fn test_corpus_missing_label_names_field() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("data.json");
        let mut value = serde_json::to_value(labeled_corpus(2)).unwrap();
        value[0].as_object_mut().unwrap().remove("label");
        std::fs::write(&corpus_path, serde_json::to_vec(&value).unwrap()).unwrap();

        match load_corpus(&corpus_path).await {
            Err(TrainingError::Corpus(RecordError::MissingField(field))) => {
                assert_eq!(field, "label")
            }
            other => panic!("expected missing label, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_absent_corpus_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_corpus(&dir.path().join("nope.json")).await,
            Err(TrainingError::CorpusRead { .. })
        ));
    }
}
