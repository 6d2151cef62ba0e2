//! Offline training: labeled corpus → feature matrix → fitted, evaluated artifact.

pub mod split;
pub mod trainer;

pub use split::{stratified_split, Split};
pub use trainer::{load_corpus, Trainer, TrainingReport};

use std::path::PathBuf;

use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::features::FeatureError;
use crate::model_store::ModelStoreError;
use crate::models::RecordError;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("failed to read training corpus {}: {source}", path.display())]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid training corpus: {0}")]
    Corpus(#[from] RecordError),

    #[error("example {index} has label {label}; labels must be 0 or 1")]
    InvalidLabel { index: usize, label: u8 },

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("class {class} needs at least {required} examples, found {found}")]
    InsufficientData {
        class: u8,
        required: usize,
        found: usize,
    },

    #[error("test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),

    #[error("training task aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Store(#[from] ModelStoreError),
}
