use std::sync::Arc;

use tracing::trace;

use crate::features::{ReferenceData, Side};
use crate::models::{JobRecord, TalentRecord};

/// Requirement tier of a job's language entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    MustHave,
    ShouldHave,
}

/// A language entry whose rating resolved to a rank. `tier` is `None` on the talent side.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedLanguage {
    pub title: String,
    pub rating: String,
    pub rank: f64,
    pub tier: Option<Tier>,
}

/// Scalar maturity attributes. `None` means the label had no rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Maturity {
    pub degree_rank: Option<f64>,
    pub seniority_rank: Option<f64>,
    pub salary: f64,
}

/// Intermediate representation of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProfile {
    pub side: Side,
    /// Matched universe roles, first occurrence order. Each carries indicator 1.
    pub roles: Vec<String>,
    pub languages: Vec<RatedLanguage>,
    pub maturity: Maturity,
}

/// Normalizes raw records against the reference universes and rank mappings.
///
/// Labels missing from a rank mapping are dropped rather than defaulted:
/// an unrated language disappears, an unknown degree or seniority becomes `None`.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    reference: Arc<ReferenceData>,
}

impl FeatureExtractor {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn extract_talent(&self, talent: &TalentRecord) -> ExtractedProfile {
        let languages = talent
            .languages
            .iter()
            .filter_map(|l| self.rate(&l.title, &l.rating, None))
            .collect();

        ExtractedProfile {
            side: Side::Talent,
            roles: self.extract_roles(&talent.job_roles),
            languages,
            maturity: Maturity {
                degree_rank: self.degree_rank(&talent.degree),
                seniority_rank: self.reference.seniority_ranks.rank(&talent.seniority),
                salary: talent.salary_expectation,
            },
        }
    }

    pub fn extract_job(&self, job: &JobRecord) -> ExtractedProfile {
        let languages = job
            .languages
            .iter()
            .filter_map(|l| {
                let tier = if l.must_have {
                    Tier::MustHave
                } else {
                    Tier::ShouldHave
                };
                self.rate(&l.title, &l.rating, Some(tier))
            })
            .collect();

        ExtractedProfile {
            side: Side::Job,
            roles: self.extract_roles(&job.job_roles),
            languages,
            maturity: Maturity {
                degree_rank: self.degree_rank(&job.min_degree),
                seniority_rank: self.mean_seniority_rank(&job.seniorities),
                salary: job.max_salary,
            },
        }
    }

    fn extract_roles(&self, roles: &[String]) -> Vec<String> {
        let mut matched: Vec<String> = Vec::with_capacity(roles.len());
        for role in roles {
            if self.reference.roles.contains(role) && !matched.contains(role) {
                matched.push(role.clone());
            }
        }
        matched
    }

    fn rate(&self, title: &str, rating: &str, tier: Option<Tier>) -> Option<RatedLanguage> {
        let Some(rank) = self.reference.rating_ranks.rank(rating) else {
            trace!(title, rating, "Dropping language with unmapped rating");
            return None;
        };
        Some(RatedLanguage {
            title: title.to_string(),
            rating: rating.to_string(),
            rank,
            tier,
        })
    }

    fn degree_rank(&self, degree: &str) -> Option<f64> {
        self.reference.degree_ranks.rank(degree)
    }

    /// Mean rank over the mappable seniorities; `None` when none are mappable.
    fn mean_seniority_rank(&self, seniorities: &[String]) -> Option<f64> {
        let ranks: Vec<f64> = seniorities
            .iter()
            .filter_map(|s| self.reference.seniority_ranks.rank(s))
            .collect();
        if ranks.is_empty() {
            return None;
        }
        Some(ranks.iter().sum::<f64>() / ranks.len() as f64)
    }
}
