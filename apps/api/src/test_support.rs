//! Fixtures shared by unit tests across modules.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use crate::classifier::{Classifier, ClassifierError};
use crate::config::{FeatureConfig, TrainingConfig};
use crate::features::{FeatureExtractor, FeatureMatrix, FeaturePipeline, ReferenceData, P_ROLE_MATCH};
use crate::matching::Matcher;
use crate::models::{JobRecord, LabeledExample, LanguageRequirement, LanguageSkill, TalentRecord};

const ROLES: &[&str] = &[
    "frontend-developer",
    "backend-developer",
    "full-stack-developer",
    "java-developer",
    "mobile-developer",
    "c-c-developer",
    "qa-engineer",
    "devops-engineer",
    "php-developer",
];
const LANGUAGES: &[&str] = &["German", "English"];
const MATURITY: &[&str] = &[
    "degree_rank_TALENT",
    "seniority_rank_TALENT",
    "salary_TALENT",
    "degree_rank_JOB",
    "seniority_rank_JOB",
    "salary_JOB",
    "salary_discrepancy",
    "degree_discrepancy",
    "seniority_rank_discrepancy",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn ranks(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Every column the pipeline can produce for `sample_config`, in assembly order.
pub(crate) fn all_features() -> Vec<String> {
    let mut columns = Vec::new();
    for suffix in ["_TALENT", "_JOB"] {
        columns.extend(ROLES.iter().map(|r| format!("{r}{suffix}")));
    }
    columns.push("p_role_match".to_string());
    for suffix in [
        "_TALENT",
        "_must_have_JOB",
        "_should_have_JOB",
        "_must_have_discrepancy",
        "_should_have_discrepancy",
    ] {
        columns.extend(LANGUAGES.iter().map(|l| format!("{l}{suffix}")));
    }
    columns.extend(strings(MATURITY));
    columns
}

pub(crate) fn sample_config() -> FeatureConfig {
    FeatureConfig {
        job_role_universe: strings(ROLES),
        job_language_universe: strings(LANGUAGES),
        seniority_rank_mapping: ranks(&[("junior", 1.0), ("midlevel", 2.0), ("senior", 3.0)]),
        degree_rank_mapping: ranks(&[
            ("none", 0.0),
            ("apprenticeship", 1.0),
            ("bachelor", 2.0),
            ("master", 3.0),
            ("doctorate", 4.0),
        ]),
        language_rating_rank_mapping: ranks(&[("B1", 1.0), ("B2", 2.0), ("C1", 3.0), ("C2", 4.0)]),
        features: all_features(),
        training: TrainingConfig::default(),
    }
}

pub(crate) fn sample_extractor() -> FeatureExtractor {
    FeatureExtractor::new(ReferenceData::from_config(&sample_config()).unwrap())
}

pub(crate) fn sample_pipeline() -> FeaturePipeline {
    FeaturePipeline::from_config(&sample_config()).unwrap()
}

/// Stand-in classifier that reports `p_role_match` as the match probability.
pub(crate) struct RoleOverlap {
    column: usize,
}

impl RoleOverlap {
    pub(crate) fn new() -> Self {
        let column = all_features()
            .iter()
            .position(|c| c == P_ROLE_MATCH)
            .unwrap();
        Self { column }
    }
}

impl Classifier for RoleOverlap {
    fn fit(&mut self, _: &FeatureMatrix, _: &[u8]) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        Ok(features.rows().iter().map(|r| r[self.column]).collect())
    }
}

pub(crate) fn sample_matcher() -> Matcher {
    Matcher::new(sample_pipeline(), Arc::new(RoleOverlap::new()))
}

fn skill(title: &str, rating: &str) -> LanguageSkill {
    LanguageSkill {
        title: title.to_string(),
        rating: rating.to_string(),
    }
}

fn requirement(title: &str, rating: &str, must_have: bool) -> LanguageRequirement {
    LanguageRequirement {
        title: title.to_string(),
        rating: rating.to_string(),
        must_have,
    }
}

/// Junior web developer, German/English C2, 48k.
pub(crate) fn talent() -> TalentRecord {
    TalentRecord {
        languages: vec![
            skill("German", "C2"),
            skill("English", "C2"),
            skill("French", "B2"),
            skill("Turkish", "A2"),
        ],
        job_roles: strings(&[
            "frontend-developer",
            "backend-developer",
            "full-stack-developer",
            "java-developer",
            "mobile-developer",
        ]),
        seniority: "junior".to_string(),
        salary_expectation: 48000.0,
        degree: "bachelor".to_string(),
    }
}

/// Midlevel QA/devops profile, 70k.
pub(crate) fn other_talent() -> TalentRecord {
    TalentRecord {
        languages: vec![
            skill("German", "C2"),
            skill("English", "C1"),
            skill("Russian", "C1"),
        ],
        job_roles: strings(&["c-c-developer", "qa-engineer", "devops-engineer"]),
        seniority: "midlevel".to_string(),
        salary_expectation: 70000.0,
        degree: "bachelor".to_string(),
    }
}

/// Frontend opening, German C1 + English B2 required, up to 70k.
pub(crate) fn job() -> JobRecord {
    JobRecord {
        languages: vec![
            requirement("German", "C1", true),
            requirement("English", "B2", true),
        ],
        job_roles: strings(&["frontend-developer"]),
        seniorities: strings(&["junior", "midlevel"]),
        max_salary: 70000.0,
        min_degree: "none".to_string(),
    }
}

/// PHP opening, midlevel or senior, up to 80k.
pub(crate) fn other_job() -> JobRecord {
    JobRecord {
        languages: vec![
            requirement("German", "C1", true),
            requirement("English", "C1", true),
        ],
        job_roles: strings(&["php-developer"]),
        seniorities: strings(&["midlevel", "senior"]),
        max_salary: 80000.0,
        min_degree: "none".to_string(),
    }
}

/// `n` labeled pairs, alternating matches and non-matches. Positives pair
/// `talent()` with `job()`; negatives pair `other_talent()` with `other_job()`.
/// Salaries vary with the index so rows are not all identical.
pub(crate) fn labeled_corpus(n: usize) -> Vec<LabeledExample> {
    (0..n)
        .map(|i| {
            let bump = (i / 2) as f64 * 500.0;
            if i % 2 == 0 {
                let mut talent = talent();
                talent.salary_expectation += bump;
                LabeledExample {
                    talent,
                    job: job(),
                    label: 1,
                }
            } else {
                let mut talent = other_talent();
                talent.salary_expectation += bump;
                LabeledExample {
                    talent,
                    job: other_job(),
                    label: 0,
                }
            }
        })
        .collect()
}

fn role_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "frontend-developer",
        "qa-engineer",
        "php-developer",
        "devops-engineer",
        "astronaut",
        "",
    ])
    .prop_map(String::from)
}

fn language_title() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["German", "English", "French"]).prop_map(String::from)
}

fn rating() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["B1", "B2", "C1", "C2", "c2", "X9"]).prop_map(String::from)
}

fn seniority() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["junior", "midlevel", "senior", "wizard"]).prop_map(String::from)
}

fn degree() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["none", "bachelor", "master", "honorary"]).prop_map(String::from)
}

/// Talents mixing in-universe and foreign roles, languages and labels.
pub(crate) fn talent_strategy() -> impl Strategy<Value = TalentRecord> {
    (
        prop::collection::vec((language_title(), rating()), 0..5),
        prop::collection::vec(role_name(), 0..6),
        seniority(),
        0.0f64..200_000.0,
        degree(),
    )
        .prop_map(|(languages, job_roles, seniority, salary_expectation, degree)| {
            TalentRecord {
                languages: languages
                    .into_iter()
                    .map(|(title, rating)| LanguageSkill { title, rating })
                    .collect(),
                job_roles,
                seniority,
                salary_expectation,
                degree,
            }
        })
}

pub(crate) fn job_strategy() -> impl Strategy<Value = JobRecord> {
    (
        prop::collection::vec((language_title(), rating(), any::<bool>()), 0..5),
        prop::collection::vec(role_name(), 0..4),
        prop::collection::vec(seniority(), 0..3),
        0.0f64..200_000.0,
        degree(),
    )
        .prop_map(|(languages, job_roles, seniorities, max_salary, min_degree)| JobRecord {
            languages: languages
                .into_iter()
                .map(|(title, rating, must_have)| LanguageRequirement {
                    title,
                    rating,
                    must_have,
                })
                .collect(),
            job_roles,
            seniorities,
            max_salary,
            min_degree,
        })
}
