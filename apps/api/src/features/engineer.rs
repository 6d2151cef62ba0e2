//! Feature engineering — pivots two extracted profiles into one fixed-schema row.
//!
//! The assembled layout is computed once per engineer from the universes:
//!
//! | block    | columns                                                          |
//! |----------|------------------------------------------------------------------|
//! | role     | `<role>_TALENT`…, `<role>_JOB`…, `p_role_match`                  |
//! | language | `<lang>_TALENT`…, `<lang>_must_have_JOB`…, `<lang>_should_have_JOB`…, |
//! |          | `<lang>_must_have_discrepancy`…, `<lang>_should_have_discrepancy`… |
//! | maturity | talent/job degree, seniority and salary, then three discrepancies |
//!
//! The configured feature list is resolved against that layout up front, so a
//! name the pipeline cannot produce fails construction instead of a request.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::features::{ExtractedProfile, FeatureError, FeatureRow, ReferenceData, Side, Tier};

pub const P_ROLE_MATCH: &str = "p_role_match";

/// Value imputed wherever a feature is undefined: a zero `p_role_match`
/// denominator, or a degree/seniority label that had no rank.
pub const UNDEFINED_SENTINEL: f64 = 0.0;

const MATURITY_COLUMNS: [&str; 9] = [
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

#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    reference: Arc<ReferenceData>,
    width: usize,
    /// Configured feature names, shared by every row this engineer emits.
    columns: Arc<[String]>,
    /// `projection[i]` = position of `columns[i]` in the assembled layout.
    projection: Vec<usize>,
}

impl FeatureEngineer {
    pub fn new(reference: Arc<ReferenceData>) -> Result<Self, FeatureError> {
        let assembled = assembled_columns(&reference);

        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(assembled.len());
        for (idx, name) in assembled.iter().enumerate() {
            if positions.insert(name.as_str(), idx).is_some() {
                return Err(FeatureError::AmbiguousColumn(name.clone()));
            }
        }

        let mut projection = Vec::with_capacity(reference.features.len());
        let mut unknown = Vec::new();
        for feature in &reference.features {
            match positions.get(feature.as_str()) {
                Some(&idx) => projection.push(idx),
                None => unknown.push(feature.clone()),
            }
        }
        if !unknown.is_empty() {
            return Err(FeatureError::UnknownFeatures(unknown));
        }

        Ok(Self {
            width: assembled.len(),
            columns: reference.features.iter().cloned().collect(),
            projection,
            reference,
        })
    }

    /// Output column names, in order.
    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    pub fn engineer(
        &self,
        talent: &ExtractedProfile,
        job: &ExtractedProfile,
    ) -> Result<FeatureRow, FeatureError> {
        expect_side(talent, Side::Talent)?;
        expect_side(job, Side::Job)?;

        let mut assembled = Vec::with_capacity(self.width);
        self.role_block(talent, job, &mut assembled);
        self.language_block(talent, job, &mut assembled);
        maturity_block(talent, job, &mut assembled);
        debug_assert_eq!(assembled.len(), self.width);

        let values = self.projection.iter().map(|&idx| assembled[idx]).collect();
        Ok(FeatureRow::new(Arc::clone(&self.columns), values))
    }

    fn role_block(&self, talent: &ExtractedProfile, job: &ExtractedProfile, out: &mut Vec<f64>) {
        let roles = &self.reference.roles;
        let talent_roles = roles.fill(talent.roles.iter().map(|r| (r.as_str(), 1.0)));
        let job_roles = roles.fill(job.roles.iter().map(|r| (r.as_str(), 1.0)));
        let p_role_match = role_match_ratio(&talent_roles, &job_roles);

        out.extend_from_slice(&talent_roles);
        out.extend_from_slice(&job_roles);
        out.push(p_role_match);
    }

    fn language_block(
        &self,
        talent: &ExtractedProfile,
        job: &ExtractedProfile,
        out: &mut Vec<f64>,
    ) {
        let languages = &self.reference.languages;
        let offered = languages.fill(
            talent
                .languages
                .iter()
                .map(|l| (l.title.as_str(), l.rank)),
        );
        let required = |tier: Tier| {
            languages.fill(
                job.languages
                    .iter()
                    .filter(move |l| l.tier == Some(tier))
                    .map(|l| (l.title.as_str(), l.rank)),
            )
        };
        let must_have = required(Tier::MustHave);
        let should_have = required(Tier::ShouldHave);

        out.extend_from_slice(&offered);
        out.extend_from_slice(&must_have);
        out.extend_from_slice(&should_have);
        out.extend(discrepancy(&must_have, &offered));
        out.extend(discrepancy(&should_have, &offered));
    }
}

fn maturity_block(talent: &ExtractedProfile, job: &ExtractedProfile, out: &mut Vec<f64>) {
    let degree_talent = impute(talent.maturity.degree_rank, "degree_rank_TALENT");
    let seniority_talent = impute(talent.maturity.seniority_rank, "seniority_rank_TALENT");
    let salary_talent = talent.maturity.salary;
    let degree_job = impute(job.maturity.degree_rank, "degree_rank_JOB");
    let seniority_job = impute(job.maturity.seniority_rank, "seniority_rank_JOB");
    let salary_job = job.maturity.salary;

    out.extend_from_slice(&[
        degree_talent,
        seniority_talent,
        salary_talent,
        degree_job,
        seniority_job,
        salary_job,
        salary_talent - salary_job,
        degree_talent - degree_job,
        seniority_talent - seniority_job,
    ]);
}

/// Share of the job's roles that the talent also holds. The job side is the
/// denominator; a job with no universe roles scores `UNDEFINED_SENTINEL`.
pub fn role_match_ratio(talent_roles: &[f64], job_roles: &[f64]) -> f64 {
    let required: f64 = job_roles.iter().sum();
    if required == 0.0 {
        debug!("Job has no roles in the universe; p_role_match imputed");
        return UNDEFINED_SENTINEL;
    }
    let overlap: f64 = talent_roles
        .iter()
        .zip(job_roles)
        .map(|(t, j)| t * j)
        .sum();
    overlap / required
}

/// Requirement minus offer per slot; positive means the talent falls short.
fn discrepancy<'a>(required: &'a [f64], offered: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
    required.iter().zip(offered).map(|(r, o)| r - o)
}

fn impute(value: Option<f64>, column: &'static str) -> f64 {
    value.unwrap_or_else(|| {
        debug!(column, "Undefined rank imputed");
        UNDEFINED_SENTINEL
    })
}

fn expect_side(profile: &ExtractedProfile, expected: Side) -> Result<(), FeatureError> {
    if profile.side != expected {
        return Err(FeatureError::SideMismatch {
            expected,
            found: profile.side,
        });
    }
    Ok(())
}

/// Every column the engineer can produce, in assembly order.
fn assembled_columns(reference: &ReferenceData) -> Vec<String> {
    let roles = &reference.roles;
    let languages = &reference.languages;

    let mut columns = Vec::new();
    columns.extend(roles.column_names(Side::Talent.suffix()));
    columns.extend(roles.column_names(Side::Job.suffix()));
    columns.push(P_ROLE_MATCH.to_string());
    columns.extend(languages.column_names(Side::Talent.suffix()));
    columns.extend(languages.column_names("_must_have_JOB"));
    columns.extend(languages.column_names("_should_have_JOB"));
    columns.extend(languages.column_names("_must_have_discrepancy"));
    columns.extend(languages.column_names("_should_have_discrepancy"));
    columns.extend(MATURITY_COLUMNS.iter().map(|c| c.to_string()));
    columns
}
