use anyhow::{Context, Result};
use tracing::info;

use talent_match::config::{Config, FeatureConfig};
use talent_match::features::FeaturePipeline;
use talent_match::model_store::FileModelStore;
use talent_match::telemetry;
use talent_match::training::Trainer;

/// Offline job: corpus at `TRAINING_DATA_PATH` → model at `MODEL_PATH`.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.rust_log);

    let feature_config = FeatureConfig::load(&config.config_dir, config.stage.as_deref())?;
    let pipeline = FeaturePipeline::from_config(&feature_config)
        .context("feature configuration is inconsistent")?;
    let trainer = Trainer::new(pipeline, feature_config.training.clone());
    let store = FileModelStore::new(&config.model_path);

    info!(
        "Training on {} with {:?}",
        config.training_data_path.display(),
        feature_config.training
    );
    let report = trainer
        .run(&config.training_data_path, &store)
        .await
        .with_context(|| format!("training from {} failed", config.training_data_path.display()))?;

    info!(
        train = report.train_size,
        holdout = report.holdout_size,
        accuracy = report.accuracy,
        "Saved model {} to {}",
        report.artifact.id,
        config.model_path.display()
    );
    Ok(())
}
