//! Persistence for fitted classifiers.
//!
//! Artifacts record the feature columns they were fitted on; loading one into
//! a deployment with a different feature list is refused up front.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::classifier::GradientBoostingClassifier;

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("failed to read model from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write model to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model at {} is not a valid artifact: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode model: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(
        "model was fitted on {} features but {} are configured (first difference: {})",
        trained.len(),
        configured.len(),
        first_difference(trained, configured)
    )]
    FeatureMismatch {
        trained: Vec<String>,
        configured: Vec<String>,
    },

    #[error("model at {} is unusable: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

fn first_difference(trained: &[String], configured: &[String]) -> String {
    let position = trained
        .iter()
        .zip(configured)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| trained.len().min(configured.len()));
    format!(
        "column {position}: trained `{}`, configured `{}`",
        trained.get(position).map_or("-", String::as_str),
        configured.get(position).map_or("-", String::as_str),
    )
}

/// A fitted classifier plus the metadata needed to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    /// Feature columns, in the order the classifier consumes them.
    pub features: Vec<String>,
    pub holdout_accuracy: f64,
    pub classifier: GradientBoostingClassifier,
}

impl ModelArtifact {
    pub fn new(
        features: Vec<String>,
        holdout_accuracy: f64,
        classifier: GradientBoostingClassifier,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            features,
            holdout_accuracy,
            classifier,
        }
    }

    /// Fails unless `configured` is exactly the fitted column list.
    pub fn ensure_features(&self, configured: &[String]) -> Result<(), ModelStoreError> {
        if self.features != configured {
            return Err(ModelStoreError::FeatureMismatch {
                trained: self.features.clone(),
                configured: configured.to_vec(),
            });
        }
        Ok(())
    }

    /// Checks that the classifier can score rows of the recorded width.
    /// Returns a description of the first inconsistency found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let Some(width) = self.classifier.n_features() else {
            return Err("classifier was never fitted".to_string());
        };
        if width != self.features.len() {
            return Err(format!(
                "classifier expects {width} features but {} are listed",
                self.features.len()
            ));
        }
        match self.classifier.max_feature() {
            Some(feature) if feature >= width => Err(format!(
                "a tree splits on feature {feature} of a {width}-wide row"
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn load(&self) -> Result<ModelArtifact, ModelStoreError>;
    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ModelStoreError>;
}

/// Stores one artifact as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn load(&self) -> Result<ModelArtifact, ModelStoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ModelStoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        let artifact: ModelArtifact =
            serde_json::from_slice(&bytes).map_err(|source| ModelStoreError::Decode {
                path: self.path.clone(),
                source,
            })?;
        artifact
            .check_consistency()
            .map_err(|reason| ModelStoreError::Corrupt {
                path: self.path.clone(),
                reason,
            })?;

        info!(
            id = %artifact.id,
            trained_at = %artifact.trained_at,
            features = artifact.features.len(),
            "Model loaded from {}",
            self.path.display()
        );
        Ok(artifact)
    }

    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ModelStoreError> {
        let bytes = serde_json::to_vec_pretty(artifact).map_err(ModelStoreError::Encode)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|join| ModelStoreError::Write {
                path: self.path.clone(),
                source: std::io::Error::other(join),
            })?
            .map_err(|source| ModelStoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!(id = %artifact.id, "Model saved to {}", self.path.display());
        Ok(())
    }
}

/// Writes a sibling temp file, then renames it over `path`. Readers see the
/// old file or the new one, never a partial write.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
