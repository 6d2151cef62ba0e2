use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::classifier::BoostingParams;

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding `COMMON.{toml,json,yaml}` and optional stage overlays.
    pub config_dir: PathBuf,
    pub stage: Option<String>,
    pub model_path: PathBuf,
    pub training_data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            config_dir: PathBuf::from(env_or("MATCH_CONFIG_DIR", "config")),
            stage: std::env::var("MATCH_STAGE").ok().filter(|s| !s.is_empty()),
            model_path: PathBuf::from(env_or("MODEL_PATH", "model/model.json")),
            training_data_path: PathBuf::from(env_or("TRAINING_DATA_PATH", "data/data.json")),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

const COMMON_CONFIG_STEM: &str = "COMMON";
const CONFIG_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];
/// Environment overrides look like `MATCH__TRAINING__SEED=7`.
const ENV_PREFIX: &str = "MATCH";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no COMMON config found in {}", .0.display())]
    NoCommonConfig(PathBuf),

    #[error("failed to load feature config: {0}")]
    Load(#[from] config::ConfigError),
}

/// Reference data that fixes the feature schema for a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub job_role_universe: Vec<String>,
    pub job_language_universe: Vec<String>,
    pub seniority_rank_mapping: BTreeMap<String, f64>,
    pub degree_rank_mapping: BTreeMap<String, f64>,
    pub language_rating_rank_mapping: BTreeMap<String, f64>,
    /// Final output columns, in order.
    pub features: Vec<String>,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let boosting = BoostingParams::default();
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_estimators: boosting.n_estimators,
            learning_rate: boosting.learning_rate,
            max_depth: boosting.max_depth,
            min_samples_split: boosting.min_samples_split,
        }
    }
}

impl TrainingConfig {
    pub fn boosting_params(&self) -> BoostingParams {
        BoostingParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }
}

impl FeatureConfig {
    /// Layers sources, later ones winning:
    /// 1. `{dir}/COMMON.*` (required)
    /// 2. `{dir}/{stage}.*` (optional)
    /// 3. `MATCH__*` environment variables
    pub fn load(dir: &Path, stage: Option<&str>) -> Result<Self, ConfigError> {
        let common = find_config_file(dir, COMMON_CONFIG_STEM).ok_or_else(|| {
            error!("No COMMON config found in {}", dir.display());
            ConfigError::NoCommonConfig(dir.to_path_buf())
        })?;

        let mut builder = config::Config::builder().add_source(config::File::from(common));
        if let Some(stage) = stage {
            let overlay = dir.join(stage);
            builder = builder
                .add_source(config::File::with_name(&overlay.to_string_lossy()).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR),
        );

        let loaded: FeatureConfig = builder.build()?.try_deserialize()?;
        info!(
            dir = %dir.display(),
            stage = stage.unwrap_or("-"),
            roles = loaded.job_role_universe.len(),
            languages = loaded.job_language_universe.len(),
            features = loaded.features.len(),
            "Feature config loaded"
        );
        Ok(loaded)
    }
}

fn find_config_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}
