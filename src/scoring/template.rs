use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::ScoringError;

/// Value type of a scorecard field. Only numeric fields take part in scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    #[default]
    Numeric,
}

/// One line of a game's scorecard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
}

impl TemplateField {
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Numeric,
        }
    }
}

/// Per-field values a player entered on a scorecard, keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreDetails(BTreeMap<String, i32>);

impl ScoreDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: i32) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<i32> {
        self.0.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Checks that a field list can serve as a score template: at least one field,
/// no blank keys, no key used twice.
pub fn validate_fields(fields: &[TemplateField]) -> Result<(), ScoringError> {
    if fields.is_empty() {
        return Err(ScoringError::InvalidTemplate(
            "template must define at least one field".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in fields {
        if field.key.trim().is_empty() {
            return Err(ScoringError::InvalidTemplate(
                "field keys cannot be blank".to_string(),
            ));
        }
        if !seen.insert(field.key.as_str()) {
            return Err(ScoringError::InvalidTemplate(format!(
                "duplicate field key '{}'",
                field.key
            )));
        }
    }

    Ok(())
}

/// Sums the values of every template field. Missing fields count as zero,
/// values keyed by a field the template does not define are rejected.
pub fn compute_raw_score(
    fields: &[TemplateField],
    values: &ScoreDetails,
) -> Result<i32, ScoringError> {
    if let Some(unknown) = values
        .keys()
        .find(|key| !fields.iter().any(|field| field.key == *key))
    {
        return Err(ScoringError::UnknownField(unknown.to_string()));
    }

    let total: i64 = fields
        .iter()
        .filter(|field| field.kind == FieldKind::Numeric)
        .map(|field| values.get(&field.key).map(i64::from).unwrap_or_default())
        .sum();

    i32::try_from(total).map_err(|_| ScoringError::ScoreOverflow)
}
