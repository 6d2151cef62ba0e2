//! Feature pipeline — turns a talent/job pair into the fixed-schema row the classifier sees.
//!
//! extractor: raw record → `ExtractedProfile` (no knowledge of output columns)
//! engineer:  talent profile + job profile → `FeatureRow` in configured column order
//! pipeline:  the one composition of the two, shared by matching and training

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod engineer;
pub mod extractor;
pub mod pipeline;
pub mod reference;
pub mod row;

pub use engineer::{FeatureEngineer, P_ROLE_MATCH, UNDEFINED_SENTINEL};
pub use extractor::{ExtractedProfile, FeatureExtractor, Maturity, RatedLanguage, Tier};
pub use pipeline::FeaturePipeline;
pub use reference::{RankMapping, ReferenceData, Universe};
pub use row::{FeatureMatrix, FeatureRow};

/// Which record of a pair a profile came from. Drives column suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Talent,
    Job,
}

impl Side {
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Talent => "_TALENT",
            Side::Job => "_JOB",
        }
    }
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid {universe} universe: {reason}")]
    InvalidUniverse {
        universe: &'static str,
        reason: String,
    },

    #[error("feature list is empty")]
    EmptyFeatureList,

    #[error("feature `{0}` is listed more than once")]
    DuplicateFeature(String),

    #[error("column `{0}` is produced by more than one feature block")]
    AmbiguousColumn(String),

    #[error("schema mismatch: configured features not produced by the pipeline: {}", .0.join(", "))]
    UnknownFeatures(Vec<String>),

    #[error("schema mismatch: row has {found} columns, matrix expects {expected}")]
    ColumnMismatch { expected: usize, found: usize },

    #[error("expected a {expected:?} profile, got {found:?}")]
    SideMismatch { expected: Side, found: Side },
}
