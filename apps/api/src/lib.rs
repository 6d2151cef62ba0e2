//! Talent/job match scoring: feature pipeline, classifier, training and the HTTP surface.

pub mod classifier;
pub mod config;
pub mod errors;
pub mod features;
pub mod matching;
pub mod model_store;
pub mod models;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod training;

#[cfg(test)]
pub(crate) mod test_support;
