use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::config::FeatureConfig;
use crate::features::FeatureError;

/// An ordered set of category identifiers. Each member owns one fixed slot,
/// so every per-universe vector has the same length and layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    members: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Universe {
    pub fn new(name: &'static str, members: Vec<String>) -> Result<Self, FeatureError> {
        if members.is_empty() {
            return Err(FeatureError::InvalidUniverse {
                universe: name,
                reason: "no members".to_string(),
            });
        }

        let mut positions = HashMap::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            if positions.insert(member.clone(), idx).is_some() {
                return Err(FeatureError::InvalidUniverse {
                    universe: name,
                    reason: format!("`{member}` appears more than once"),
                });
            }
        }

        Ok(Self { members, positions })
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn position(&self, member: &str) -> Option<usize> {
        self.positions.get(member).copied()
    }

    pub fn contains(&self, member: &str) -> bool {
        self.positions.contains_key(member)
    }

    /// Pivots `(member, value)` entries onto the universe.
    ///
    /// Always returns exactly one value per member: absent members are 0,
    /// entries outside the universe are ignored, and an empty input yields an
    /// all-zero row. Repeated members keep the largest value.
    pub fn fill<'a, I>(&self, entries: I) -> Vec<f64>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut row: Vec<f64> = vec![0.0; self.members.len()];
        let mut seen = vec![false; self.members.len()];
        for (member, value) in entries {
            if let Some(idx) = self.position(member) {
                row[idx] = if seen[idx] { row[idx].max(value) } else { value };
                seen[idx] = true;
            }
        }
        row
    }

    /// Column names for this universe, e.g. `German` + `_TALENT` → `German_TALENT`.
    pub fn column_names(&self, suffix: &str) -> Vec<String> {
        self.members.iter().map(|m| format!("{m}{suffix}")).collect()
    }
}

/// Partial mapping from an ordinal label to its rank. Labels compare
/// case-insensitively; labels outside the mapping have no rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankMapping {
    ranks: HashMap<String, f64>,
}

impl RankMapping {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            ranks: entries
                .into_iter()
                .map(|(label, rank)| (label.as_ref().to_lowercase(), rank))
                .collect(),
        }
    }

    pub fn rank(&self, label: &str) -> Option<f64> {
        self.ranks.get(&label.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Validated, immutable view of `FeatureConfig`, shared by extractor and engineer.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub roles: Universe,
    pub languages: Universe,
    pub seniority_ranks: RankMapping,
    pub degree_ranks: RankMapping,
    pub rating_ranks: RankMapping,
    pub features: Vec<String>,
}

impl ReferenceData {
    pub fn from_config(config: &FeatureConfig) -> Result<Arc<Self>, FeatureError> {
        if config.features.is_empty() {
            return Err(FeatureError::EmptyFeatureList);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = config.features.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(FeatureError::DuplicateFeature(dup.clone()));
        }

        Ok(Arc::new(Self {
            roles: Universe::new("job role", config.job_role_universe.clone())?,
            languages: Universe::new("job language", config.job_language_universe.clone())?,
            seniority_ranks: rank_mapping(&config.seniority_rank_mapping),
            degree_ranks: rank_mapping(&config.degree_rank_mapping),
            rating_ranks: rank_mapping(&config.language_rating_rank_mapping),
            features: config.features.clone(),
        }))
    }
}

fn rank_mapping(entries: &BTreeMap<String, f64>) -> RankMapping {
    RankMapping::new(entries.iter().map(|(label, rank)| (label, *rank)))
}
