use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use talent_match::config::{Config, FeatureConfig};
use talent_match::features::FeaturePipeline;
use talent_match::matching::Matcher;
use talent_match::model_store::{FileModelStore, ModelStore};
use talent_match::routes::build_router;
use talent_match::state::AppState;
use talent_match::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    telemetry::init(&config.rust_log);

    info!("Starting talent-match API v{}", env!("CARGO_PKG_VERSION"));

    // Feature schema: fails here, not on first request, if misconfigured
    let feature_config = FeatureConfig::load(&config.config_dir, config.stage.as_deref())?;
    let pipeline = FeaturePipeline::from_config(&feature_config)
        .context("feature configuration is inconsistent")?;
    info!("Feature pipeline ready ({} columns)", pipeline.columns().len());

    // Fitted model, checked against the configured columns
    let store = FileModelStore::new(&config.model_path);
    let artifact = store.load().await?;
    artifact.ensure_features(pipeline.columns())?;
    info!(
        "Model {} loaded (holdout accuracy {:.3})",
        artifact.id, artifact.holdout_accuracy
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        matcher: Arc::new(Matcher::new(pipeline, Arc::new(artifact.classifier))),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
