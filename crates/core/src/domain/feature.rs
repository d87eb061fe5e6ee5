use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier for a selectable project capability.
///
/// Always kebab-case (e.g. `payment-processing`). Modifier and bundle rules
/// are keyed by these ids; raw questionnaire labels are resolved into them by
/// the [`FeatureRegistry`](crate::pricing::registry::FeatureRegistry).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
