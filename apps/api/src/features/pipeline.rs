use std::sync::Arc;

use crate::config::FeatureConfig;
use crate::features::{FeatureEngineer, FeatureError, FeatureExtractor, FeatureRow, ReferenceData};
use crate::models::{JobRecord, TalentRecord};

/// Extractor → engineer. Matching and training both encode pairs through this
/// type, so a row means the same thing at inference as it did at fit time.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    extractor: FeatureExtractor,
    engineer: FeatureEngineer,
}

impl FeaturePipeline {
    pub fn new(reference: Arc<ReferenceData>) -> Result<Self, FeatureError> {
        Ok(Self {
            extractor: FeatureExtractor::new(Arc::clone(&reference)),
            engineer: FeatureEngineer::new(reference)?,
        })
    }

    pub fn from_config(config: &FeatureConfig) -> Result<Self, FeatureError> {
        Self::new(ReferenceData::from_config(config)?)
    }

    /// Output column names, in order.
    pub fn columns(&self) -> &Arc<[String]> {
        self.engineer.columns()
    }

    pub fn features(
        &self,
        talent: &TalentRecord,
        job: &JobRecord,
    ) -> Result<FeatureRow, FeatureError> {
        let talent_profile = self.extractor.extract_talent(talent);
        let job_profile = self.extractor.extract_job(job);
        self.engineer.engineer(&talent_profile, &job_profile)
    }
}
