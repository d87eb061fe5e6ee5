//! Modifier rules and the bundled adjustment pass.
//!
//! Rules are held in registration order. Order never changes the arithmetic
//! (sums and products are associative within each kind) but it fixes the
//! line-item listing, so two identical answer sets always render the same
//! breakdown.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::answers::{keys, AssessmentAnswers};
use crate::domain::feature::FeatureId;
use crate::pricing::registry::{FeatureRegistry, RuleTableError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Flat amount added to the base before any scaling.
    Additive,
    /// Fractional surcharge, e.g. `0.15` = +15%, composed by product.
    Multiplicative,
}

/// Predicate gating a rule on answers beyond its own feature selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleCondition {
    Always,
    AnswerEquals { key: String, value: String },
    MinimumListLen { key: String, len: usize },
    MinimumFeatureCount(usize),
}

impl RuleCondition {
    pub fn holds(&self, features: &BTreeSet<FeatureId>, answers: &AssessmentAnswers) -> bool {
        match self {
            RuleCondition::Always => true,
            RuleCondition::AnswerEquals { key, value } => answers
                .text(key)
                .map(|answer| answer.eq_ignore_ascii_case(value))
                .unwrap_or(false),
            RuleCondition::MinimumListLen { key, len } => answers.list(key).len() >= *len,
            RuleCondition::MinimumFeatureCount(count) => features.len() >= *count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifierRule {
    pub feature: FeatureId,
    pub kind: ModifierKind,
    pub value: Decimal,
    pub condition: RuleCondition,
    /// Line-item label override; defaults to the registry display name.
    pub label: Option<String>,
}

struct ModifierSeed {
    feature: &'static str,
    kind: ModifierKind,
    // additive: whole currency units; multiplicative: percent
    value: i64,
    label: Option<&'static str>,
}

const ADDITIVE_SEEDS: &[ModifierSeed] = &[
    ModifierSeed { feature: "user-accounts", kind: ModifierKind::Additive, value: 1_200, label: None },
    ModifierSeed { feature: "user-roles", kind: ModifierKind::Additive, value: 900, label: None },
    ModifierSeed { feature: "shopping-cart", kind: ModifierKind::Additive, value: 1_500, label: None },
    ModifierSeed { feature: "payment-processing", kind: ModifierKind::Additive, value: 1_800, label: None },
    ModifierSeed { feature: "inventory-management", kind: ModifierKind::Additive, value: 1_400, label: None },
    ModifierSeed { feature: "booking-scheduling", kind: ModifierKind::Additive, value: 1_600, label: None },
    ModifierSeed { feature: "real-time-chat", kind: ModifierKind::Additive, value: 2_200, label: None },
    ModifierSeed { feature: "cms", kind: ModifierKind::Additive, value: 1_000, label: None },
    ModifierSeed { feature: "search", kind: ModifierKind::Additive, value: 800, label: None },
    ModifierSeed { feature: "notifications", kind: ModifierKind::Additive, value: 600, label: None },
    ModifierSeed { feature: "analytics-dashboard", kind: ModifierKind::Additive, value: 1_700, label: None },
    ModifierSeed { feature: "file-uploads", kind: ModifierKind::Additive, value: 700, label: None },
    ModifierSeed { feature: "api-integration", kind: ModifierKind::Additive, value: 1_200, label: None },
    ModifierSeed { feature: "multilingual", kind: ModifierKind::Additive, value: 900, label: None },
    ModifierSeed { feature: "seo-optimization", kind: ModifierKind::Additive, value: 500, label: None },
];

const MULTIPLICATIVE_SEEDS: &[ModifierSeed] = &[
    ModifierSeed { feature: "rush-delivery", kind: ModifierKind::Multiplicative, value: 25, label: None },
    ModifierSeed { feature: "premium-design", kind: ModifierKind::Multiplicative, value: 20, label: None },
];

#[derive(Clone, Debug)]
pub struct ModifierTable {
    rules: Vec<ModifierRule>,
}

impl ModifierTable {
    pub fn new(rules: Vec<ModifierRule>) -> Self {
        Self { rules }
    }

    /// The reference rule set. Additive feature surcharges first, then the
    /// multiplicative scaling rules, matching the aggregation order.
    pub fn standard() -> Self {
        let mut rules: Vec<ModifierRule> = ADDITIVE_SEEDS
            .iter()
            .chain(MULTIPLICATIVE_SEEDS)
            .map(|seed| ModifierRule {
                feature: FeatureId::new(seed.feature),
                kind: seed.kind,
                value: match seed.kind {
                    ModifierKind::Additive => Decimal::from(seed.value),
                    ModifierKind::Multiplicative => Decimal::new(seed.value, 2),
                },
                condition: RuleCondition::Always,
                label: seed.label.map(str::to_string),
            })
            .collect();

        // Conditional scaling rules: gated on other answers, not just the
        // feature selection itself.
        rules.push(ModifierRule {
            feature: FeatureId::new("api-integration"),
            kind: ModifierKind::Multiplicative,
            value: Decimal::new(10, 2),
            condition: RuleCondition::MinimumListLen { key: keys::INTEGRATIONS.to_string(), len: 3 },
            label: Some("Integration Volume".to_string()),
        });
        rules.push(ModifierRule {
            feature: FeatureId::new("real-time-chat"),
            kind: ModifierKind::Multiplicative,
            value: Decimal::new(10, 2),
            condition: RuleCondition::AnswerEquals {
                key: keys::PROJECT_TYPE.to_string(),
                value: "mobile-app".to_string(),
            },
            label: Some("Mobile Real-Time Infrastructure".to_string()),
        });

        Self::new(rules)
    }

    pub fn rules(&self) -> &[ModifierRule] {
        &self.rules
    }

    /// Rules matching the normalized feature set and answer predicates, in
    /// registration order.
    pub fn applicable<'a>(
        &'a self,
        features: &BTreeSet<FeatureId>,
        answers: &AssessmentAnswers,
    ) -> Vec<&'a ModifierRule> {
        self.rules
            .iter()
            .filter(|rule| features.contains(&rule.feature))
            .filter(|rule| rule.condition.holds(features, answers))
            .collect()
    }

    pub fn validate(&self, registry: &FeatureRegistry) -> Result<(), RuleTableError> {
        for rule in &self.rules {
            if !registry.contains(&rule.feature) {
                return Err(RuleTableError::UnknownFeature(rule.feature.to_string()));
            }
            if rule.value < Decimal::ZERO {
                return Err(RuleTableError::NegativeValue {
                    feature: rule.feature.to_string(),
                    value: rule.value,
                });
            }
        }
        Ok(())
    }
}

/// An all-of feature combination adjusted in its own pass after the
/// per-feature modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleRule {
    pub id: String,
    pub label: String,
    pub features: Vec<FeatureId>,
    pub kind: ModifierKind,
    pub value: Decimal,
}

#[derive(Clone, Debug)]
pub struct BundleTable {
    bundles: Vec<BundleRule>,
}

impl BundleTable {
    pub fn new(bundles: Vec<BundleRule>) -> Self {
        Self { bundles }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            // The one discount in the reference tables: commerce features
            // share enough plumbing that the full set is cheaper than the
            // sum of its parts. Documented monotonicity exception.
            BundleRule {
                id: "commerce-bundle".to_string(),
                label: "Commerce Bundle Discount".to_string(),
                features: vec![
                    FeatureId::new("shopping-cart"),
                    FeatureId::new("payment-processing"),
                    FeatureId::new("inventory-management"),
                ],
                kind: ModifierKind::Additive,
                value: Decimal::from(-500),
            },
            BundleRule {
                id: "realtime-bundle".to_string(),
                label: "Real-Time Infrastructure Surcharge".to_string(),
                features: vec![
                    FeatureId::new("real-time-chat"),
                    FeatureId::new("notifications"),
                ],
                kind: ModifierKind::Multiplicative,
                value: Decimal::new(5, 2),
            },
        ])
    }

    pub fn bundles(&self) -> &[BundleRule] {
        &self.bundles
    }

    pub fn applicable<'a>(&'a self, features: &BTreeSet<FeatureId>) -> Vec<&'a BundleRule> {
        self.bundles
            .iter()
            .filter(|bundle| bundle.features.iter().all(|feature| features.contains(feature)))
            .collect()
    }

    pub fn validate(&self, registry: &FeatureRegistry) -> Result<(), RuleTableError> {
        for bundle in &self.bundles {
            if bundle.features.is_empty() {
                return Err(RuleTableError::EmptyBundle(bundle.id.clone()));
            }
            for feature in &bundle.features {
                if !registry.contains(feature) {
                    return Err(RuleTableError::UnknownBundleFeature {
                        bundle: bundle.id.clone(),
                        feature: feature.to_string(),
                    });
                }
            }
            if bundle.kind == ModifierKind::Multiplicative && bundle.value <= Decimal::NEGATIVE_ONE
            {
                return Err(RuleTableError::MultiplierOutOfRange {
                    id: bundle.id.clone(),
                    value: bundle.value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use crate::domain::answers::{keys, AnswerValue, AssessmentAnswers};
    use crate::domain::feature::FeatureId;
    use crate::pricing::registry::{FeatureRegistry, RuleTableError};

    use super::{
        BundleTable, ModifierKind, ModifierRule, ModifierTable, RuleCondition,
    };

    fn features(ids: &[&str]) -> BTreeSet<FeatureId> {
        ids.iter().map(|id| FeatureId::new(*id)).collect()
    }

    #[test]
    fn applicable_rules_keep_registration_order() {
        let table = ModifierTable::standard();
        let selected = features(&["payment-processing", "user-accounts", "search"]);
        let answers = AssessmentAnswers::new();

        let applied = table.applicable(&selected, &answers);
        let order: Vec<&str> = applied.iter().map(|rule| rule.feature.as_str()).collect();

        assert_eq!(order, ["user-accounts", "payment-processing", "search"]);
    }

    #[test]
    fn conditional_rule_requires_its_answer() {
        let table = ModifierTable::standard();
        let selected = features(&["api-integration"]);

        let mut sparse = AssessmentAnswers::new();
        sparse.insert(
            keys::INTEGRATIONS,
            AnswerValue::Many(vec!["stripe".to_string(), "mailchimp".to_string()]),
        );
        let few = table.applicable(&selected, &sparse);
        assert!(few.iter().all(|rule| rule.kind == ModifierKind::Additive));

        let mut heavy = sparse.clone();
        heavy.insert(
            keys::INTEGRATIONS,
            AnswerValue::Many(vec![
                "stripe".to_string(),
                "mailchimp".to_string(),
                "salesforce".to_string(),
            ]),
        );
        let many = table.applicable(&selected, &heavy);
        assert!(many.iter().any(|rule| rule.kind == ModifierKind::Multiplicative));
    }

    #[test]
    fn bundle_applies_only_when_every_member_is_selected() {
        let table = BundleTable::standard();

        let partial = features(&["shopping-cart", "payment-processing"]);
        assert!(table.applicable(&partial).is_empty());

        let full = features(&["shopping-cart", "payment-processing", "inventory-management"]);
        let applied = table.applicable(&full);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].id, "commerce-bundle");
        assert!(applied[0].value < Decimal::ZERO);
    }

    #[test]
    fn validation_rejects_rules_for_unregistered_features() {
        let registry = FeatureRegistry::standard();
        let table = ModifierTable::new(vec![ModifierRule {
            feature: FeatureId::new("time-travel"),
            kind: ModifierKind::Additive,
            value: Decimal::from(100),
            condition: RuleCondition::Always,
            label: None,
        }]);

        assert_eq!(
            table.validate(&registry),
            Err(RuleTableError::UnknownFeature("time-travel".to_string()))
        );
    }

    #[test]
    fn validation_rejects_negative_modifier_values() {
        let registry = FeatureRegistry::standard();
        let table = ModifierTable::new(vec![ModifierRule {
            feature: FeatureId::new("search"),
            kind: ModifierKind::Additive,
            value: Decimal::from(-10),
            condition: RuleCondition::Always,
            label: None,
        }]);

        assert!(matches!(
            table.validate(&registry),
            Err(RuleTableError::NegativeValue { .. })
        ));
    }

    #[test]
    fn minimum_feature_count_condition_counts_the_whole_set() {
        let condition = RuleCondition::MinimumFeatureCount(3);
        let answers = AssessmentAnswers::new();

        assert!(!condition.holds(&features(&["search", "cms"]), &answers));
        assert!(condition.holds(&features(&["search", "cms", "notifications"]), &answers));
    }

    #[test]
    fn standard_tables_validate_against_standard_registry() {
        let registry = FeatureRegistry::standard();
        ModifierTable::standard().validate(&registry).expect("modifier table well-formed");
        BundleTable::standard().validate(&registry).expect("bundle table well-formed");
    }
}
