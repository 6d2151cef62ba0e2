//! Raw talent and job records as they arrive from upstream callers.
//!
//! Field names are part of the wire contract and must not be renamed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A language a talent speaks, with a self-assessed rating label (e.g. `C1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSkill {
    pub title: String,
    pub rating: String,
}

/// A language a job asks for. `must_have = false` marks a should-have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRequirement {
    pub title: String,
    pub rating: String,
    pub must_have: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentRecord {
    pub languages: Vec<LanguageSkill>,
    pub job_roles: Vec<String>,
    pub seniority: String,
    pub salary_expectation: f64,
    pub degree: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub languages: Vec<LanguageRequirement>,
    pub job_roles: Vec<String>,
    pub seniorities: Vec<String>,
    pub max_salary: f64,
    pub min_degree: String,
}

/// One element of the training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub talent: TalentRecord,
    pub job: JobRecord,
    pub label: u8,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        match missing_field_name(&err.to_string()) {
            Some(field) => RecordError::MissingField(field),
            None => RecordError::Malformed(err),
        }
    }
}

/// Decodes a record (or a request wrapping records) from an already-parsed JSON value.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, RecordError> {
    Ok(serde_json::from_value(value)?)
}

/// Decodes a record from raw JSON bytes.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RecordError> {
    Ok(serde_json::from_slice(bytes)?)
}

// serde_json reports absent fields as "missing field `name`", optionally
// followed by a position suffix when decoding from bytes.
fn missing_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}
