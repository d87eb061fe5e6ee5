//! Canonical feature registry and answer-label normalization.
//!
//! The questionnaire sends display text ("Shopping Cart", "payments", a new
//! label the registry has never seen); modifier rules are keyed by
//! [`FeatureId`]. This module owns the mapping between the two as an explicit
//! registration-ordered table instead of scattered literal maps.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::feature::FeatureId;

/// Validation failures in the static rule/registry tables. These indicate a
/// deployment defect and abort startup; they are never produced at runtime.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleTableError {
    #[error("duplicate feature id `{0}` in registry")]
    DuplicateFeature(String),
    #[error("feature `{0}` has an empty display label")]
    EmptyLabel(String),
    #[error("modifier rule references unregistered feature `{0}`")]
    UnknownFeature(String),
    #[error("modifier rule for `{feature}` has negative value {value}")]
    NegativeValue { feature: String, value: Decimal },
    #[error("bundle `{0}` lists no member features")]
    EmptyBundle(String),
    #[error("bundle `{bundle}` references unregistered feature `{feature}`")]
    UnknownBundleFeature { bundle: String, feature: String },
    #[error("multiplicative value {value} for `{id}` would zero or negate the multiplier")]
    MultiplierOutOfRange { id: String, value: Decimal },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub id: FeatureId,
    pub label: String,
    pub aliases: Vec<String>,
}

impl FeatureEntry {
    fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str())
            .chain(std::iter::once(self.label.as_str()))
            .chain(self.aliases.iter().map(String::as_str))
    }
}

struct FeatureSeed {
    id: &'static str,
    label: &'static str,
    aliases: &'static [&'static str],
}

const FEATURE_SEEDS: &[FeatureSeed] = &[
    FeatureSeed {
        id: "user-accounts",
        label: "User Accounts",
        aliases: &["login", "authentication", "sign up", "membership"],
    },
    FeatureSeed {
        id: "user-roles",
        label: "Roles & Permissions",
        aliases: &["permissions", "access control", "admin roles"],
    },
    FeatureSeed {
        id: "shopping-cart",
        label: "Shopping Cart",
        aliases: &["cart", "checkout", "product catalog"],
    },
    FeatureSeed {
        id: "payment-processing",
        label: "Payment Processing",
        aliases: &["payments", "billing", "stripe", "subscriptions"],
    },
    FeatureSeed {
        id: "inventory-management",
        label: "Inventory Management",
        aliases: &["inventory", "stock tracking"],
    },
    FeatureSeed {
        id: "booking-scheduling",
        label: "Booking & Scheduling",
        aliases: &["appointments", "reservations", "calendar booking"],
    },
    FeatureSeed {
        id: "real-time-chat",
        label: "Real-Time Chat",
        aliases: &["chat", "live chat", "messaging"],
    },
    FeatureSeed {
        id: "cms",
        label: "Content Management",
        aliases: &["content management", "blog", "editorial tools"],
    },
    FeatureSeed { id: "search", label: "Site Search", aliases: &["full-text search", "filtering"] },
    FeatureSeed {
        id: "notifications",
        label: "Notifications",
        aliases: &["email alerts", "push notifications", "reminders"],
    },
    FeatureSeed {
        id: "analytics-dashboard",
        label: "Analytics Dashboard",
        aliases: &["analytics", "reporting", "dashboards"],
    },
    FeatureSeed {
        id: "file-uploads",
        label: "File Uploads",
        aliases: &["uploads", "media library", "documents"],
    },
    FeatureSeed {
        id: "api-integration",
        label: "API Integration",
        aliases: &["integrations", "third party api", "webhooks"],
    },
    FeatureSeed {
        id: "multilingual",
        label: "Multilingual Support",
        aliases: &["localization", "i18n", "translations"],
    },
    FeatureSeed { id: "seo-optimization", label: "SEO Optimization", aliases: &["seo"] },
    // Option features: never offered in the feature multi-select, derived
    // from the timeline / design-tier answers before normalization.
    FeatureSeed {
        id: "rush-delivery",
        label: "Rush Delivery",
        aliases: &["asap", "urgent", "rush", "expedited", "under-1-month", "1-month"],
    },
    FeatureSeed {
        id: "premium-design",
        label: "Premium Design",
        aliases: &["premium", "bespoke", "custom-design", "high-fidelity"],
    },
];

/// Shortest key length eligible for substring matching. One- and
/// two-character answers would otherwise latch onto nearly every key.
const SUBSTRING_FLOOR: usize = 3;

#[derive(Clone, Debug)]
pub struct FeatureRegistry {
    entries: Vec<FeatureEntry>,
}

impl FeatureRegistry {
    pub fn new(entries: Vec<FeatureEntry>) -> Self {
        Self { entries }
    }

    /// The built-in registry backing the standard rule tables.
    pub fn standard() -> Self {
        Self::new(
            FEATURE_SEEDS
                .iter()
                .map(|seed| FeatureEntry {
                    id: FeatureId::new(seed.id),
                    label: seed.label.to_string(),
                    aliases: seed.aliases.iter().map(|alias| (*alias).to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    /// Reverse id-to-label mapping used by line items and proposal facts.
    pub fn display_name(&self, id: &FeatureId) -> Option<&str> {
        self.entries.iter().find(|entry| &entry.id == id).map(|entry| entry.label.as_str())
    }

    /// Resolve one raw label to a canonical feature id.
    ///
    /// Resolution order, first match wins:
    /// 1. exact case-sensitive match on id, label, or alias;
    /// 2. case-insensitive exact match;
    /// 3. case-insensitive substring match in either direction.
    ///
    /// Substring ties are broken by the longest registry key, then by
    /// registration order, never by map iteration order.
    pub fn normalize(&self, raw: &str) -> Option<FeatureId> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        for entry in &self.entries {
            if entry.keys().any(|key| key == raw) {
                return Some(entry.id.clone());
            }
        }

        let lowered = raw.to_ascii_lowercase();
        for entry in &self.entries {
            if entry.keys().any(|key| key.to_ascii_lowercase() == lowered) {
                return Some(entry.id.clone());
            }
        }

        let mut best: Option<(&FeatureEntry, usize)> = None;
        for entry in &self.entries {
            for key in entry.keys() {
                let key_lower = key.to_ascii_lowercase();
                if key_lower.len().min(lowered.len()) < SUBSTRING_FLOOR {
                    continue;
                }
                if key_lower.contains(&lowered) || lowered.contains(&key_lower) {
                    let beats_current =
                        best.map(|(_, len)| key_lower.len() > len).unwrap_or(true);
                    if beats_current {
                        best = Some((entry, key_lower.len()));
                    }
                }
            }
        }

        best.map(|(entry, _)| entry.id.clone())
    }

    /// Batch form of [`normalize`](Self::normalize). Unresolved labels are
    /// dropped from the result; pricing must proceed even when the
    /// questionnaire ships option text the registry has not caught up with.
    pub fn normalize_set<I, S>(&self, labels: I) -> BTreeSet<FeatureId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = BTreeSet::new();
        for label in labels {
            let label = label.as_ref();
            match self.normalize(label) {
                Some(id) => {
                    resolved.insert(id);
                }
                None => {
                    debug!(
                        event_name = "pricing.normalize.unresolved_label",
                        label = %label,
                        "dropping feature label with no registry match"
                    );
                }
            }
        }
        resolved
    }

    pub fn validate(&self) -> Result<(), RuleTableError> {
        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id.clone()) {
                return Err(RuleTableError::DuplicateFeature(entry.id.to_string()));
            }
            if entry.label.trim().is_empty() {
                return Err(RuleTableError::EmptyLabel(entry.id.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::feature::FeatureId;

    use super::{FeatureEntry, FeatureRegistry, RuleTableError};

    #[test]
    fn exact_match_wins_before_fuzzier_passes() {
        let registry = FeatureRegistry::standard();
        assert_eq!(
            registry.normalize("Shopping Cart"),
            Some(FeatureId::new("shopping-cart"))
        );
    }

    #[test]
    fn case_insensitive_exact_match_resolves() {
        let registry = FeatureRegistry::standard();
        assert_eq!(
            registry.normalize("payment processing"),
            Some(FeatureId::new("payment-processing"))
        );
        assert_eq!(registry.normalize("STRIPE"), Some(FeatureId::new("payment-processing")));
    }

    #[test]
    fn substring_match_works_in_both_directions() {
        let registry = FeatureRegistry::standard();
        // label contains registry key
        assert_eq!(
            registry.normalize("Real-Time Chat Support"),
            Some(FeatureId::new("real-time-chat"))
        );
        // registry key contains label
        assert_eq!(registry.normalize("schedul"), Some(FeatureId::new("booking-scheduling")));
    }

    #[test]
    fn substring_ties_resolve_to_longest_key() {
        let registry = FeatureRegistry::standard();

        // "premium payments" contains both the `premium-design` alias
        // "premium" (7 chars) and the `payment-processing` alias "payments"
        // (8 chars); the longer key must win, every time.
        assert_eq!(
            registry.normalize("premium payments"),
            Some(FeatureId::new("payment-processing"))
        );
        assert_eq!(
            registry.normalize("Custom Integrations"),
            Some(FeatureId::new("api-integration"))
        );
    }

    #[test]
    fn normalizing_a_canonical_id_is_idempotent() {
        let registry = FeatureRegistry::standard();
        for entry in registry.entries() {
            assert_eq!(registry.normalize(entry.id.as_str()), Some(entry.id.clone()));
        }
    }

    #[test]
    fn unresolved_labels_are_dropped_not_fatal() {
        let registry = FeatureRegistry::standard();
        let resolved =
            registry.normalize_set(["Shopping Cart", "Quantum Entanglement Module", "payments"]);

        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&FeatureId::new("shopping-cart")));
        assert!(resolved.contains(&FeatureId::new("payment-processing")));
    }

    #[test]
    fn short_labels_do_not_substring_match() {
        let registry = FeatureRegistry::standard();
        assert_eq!(registry.normalize("a"), None);
        assert_eq!(registry.normalize("io"), None);
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let entry = FeatureEntry {
            id: FeatureId::new("search"),
            label: "Site Search".to_string(),
            aliases: Vec::new(),
        };
        let registry = FeatureRegistry::new(vec![entry.clone(), entry]);

        assert_eq!(
            registry.validate(),
            Err(RuleTableError::DuplicateFeature("search".to_string()))
        );
    }

    #[test]
    fn standard_registry_validates() {
        FeatureRegistry::standard().validate().expect("built-in registry must be well-formed");
    }
}
