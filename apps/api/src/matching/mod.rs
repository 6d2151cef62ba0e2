pub mod handlers;
pub mod matcher;

pub use matcher::{rank, MatchResult, Matcher};

use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::features::FeatureError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("classifier returned {found} scores for {expected} pairs")]
    MissingScore { expected: usize, found: usize },
}
