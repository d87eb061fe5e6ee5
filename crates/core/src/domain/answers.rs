use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single questionnaire answer.
///
/// The wizard submits free-form JSON; untagged deserialization accepts a
/// string, a string list, a number, or a boolean without the caller having to
/// label the variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    // Variant order is load-bearing for untagged deserialization: strings
    // must hit `Text` before `Number` tries to parse them as decimals.
    Flag(bool),
    Text(String),
    Number(Decimal),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Many(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AnswerValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Well-known questionnaire keys. The map accepts arbitrary keys; anything
/// the engine does not recognize is simply carried along and ignored.
pub mod keys {
    pub const PROJECT_TYPE: &str = "project_type";
    pub const FEATURES: &str = "features";
    pub const TIMELINE: &str = "timeline";
    pub const BUDGET_BAND: &str = "budget_band";
    pub const INTEGRATIONS: &str = "integrations";
    pub const DESIGN_TIER: &str = "design_tier";
}

/// The full answer set for one assessment, keyed by question.
///
/// Backed by a `BTreeMap` so iteration order (and therefore serialized form)
/// is stable across recalculations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentAnswers(pub BTreeMap<String, AnswerValue>);

impl AssessmentAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnswerValue::as_text)
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.get(key).and_then(AnswerValue::as_list).unwrap_or(&[])
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AnswerValue::as_flag)
    }

    /// Selected project type, if the wizard has reached that step.
    pub fn project_type(&self) -> Option<&str> {
        self.text(keys::PROJECT_TYPE)
    }

    /// Raw feature labels from the multi-select; empty until answered.
    pub fn feature_labels(&self) -> &[String] {
        self.list(keys::FEATURES)
    }

    pub fn timeline(&self) -> Option<&str> {
        self.text(keys::TIMELINE)
    }

    pub fn budget_band(&self) -> Option<&str> {
        self.text(keys::BUDGET_BAND)
    }

    pub fn integrations(&self) -> &[String] {
        self.list(keys::INTEGRATIONS)
    }

    pub fn design_tier(&self) -> Option<&str> {
        self.text(keys::DESIGN_TIER)
    }
}

impl FromIterator<(String, AnswerValue)> for AssessmentAnswers {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
