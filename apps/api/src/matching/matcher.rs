use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::classifier::{label_for, Classifier};
use crate::features::{FeatureMatrix, FeaturePipeline};
use crate::matching::MatchError;
use crate::models::{JobRecord, TalentRecord};

/// Classifier verdict for one talent/job pair. `score` is the match
/// probability; `label` is 1 iff `score >= 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub talent: TalentRecord,
    pub job: JobRecord,
    pub label: u8,
    pub score: f64,
}

/// Scores pairs with a fitted classifier. Read-only after construction, so
/// one instance is shared across request handlers.
#[derive(Clone)]
pub struct Matcher {
    pipeline: FeaturePipeline,
    classifier: Arc<dyn Classifier>,
}

impl Matcher {
    pub fn new(pipeline: FeaturePipeline, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            pipeline,
            classifier,
        }
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn match_pair(
        &self,
        talent: &TalentRecord,
        job: &JobRecord,
    ) -> Result<MatchResult, MatchError> {
        let row = self.pipeline.features(talent, job)?;
        let scores = self.classifier.predict_proba(&FeatureMatrix::single(row))?;
        let score = scores.first().copied().ok_or(MatchError::MissingScore {
            expected: 1,
            found: 0,
        })?;

        Ok(MatchResult {
            talent: talent.clone(),
            job: job.clone(),
            label: label_for(score),
            score,
        })
    }

    /// Scores every talent against every job, best first.
    ///
    /// Pairs are generated talent-major; equal scores keep that order.
    pub fn match_bulk(
        &self,
        talents: &[TalentRecord],
        jobs: &[JobRecord],
    ) -> Result<Vec<MatchResult>, MatchError> {
        let pairs: Vec<(&TalentRecord, &JobRecord)> = talents
            .iter()
            .flat_map(|t| jobs.iter().map(move |j| (t, j)))
            .collect();
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut matrix = FeatureMatrix::new(self.pipeline.columns().clone());
        for (talent, job) in &pairs {
            matrix.push(self.pipeline.features(talent, job)?)?;
        }

        let scores = self.classifier.predict_proba(&matrix)?;
        if scores.len() != pairs.len() {
            return Err(MatchError::MissingScore {
                expected: pairs.len(),
                found: scores.len(),
            });
        }

        let mut results: Vec<MatchResult> = pairs
            .into_iter()
            .zip(scores)
            .map(|((talent, job), score)| MatchResult {
                talent: talent.clone(),
                job: job.clone(),
                label: label_for(score),
                score,
            })
            .collect();
        rank(&mut results);

        debug!(
            talents = talents.len(),
            jobs = jobs.len(),
            matches = results.iter().filter(|r| r.label == 1).count(),
            "Bulk match scored"
        );
        Ok(results)
    }
}

/// Stable sort by descending score.
pub fn rank(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
