//! The pricing aggregator: answers in, breakdown out.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use rust_decimal::Decimal;

use crate::domain::answers::AssessmentAnswers;
use crate::domain::feature::FeatureId;
use crate::pricing::breakdown::{
    round_currency, EstimatedRange, LineItem, LineItemKind, PricingBreakdown,
};
use crate::pricing::modifiers::{BundleTable, ModifierKind, ModifierTable};
use crate::pricing::rates;
use crate::pricing::registry::{FeatureRegistry, RuleTableError};

pub trait PricingEngine: Send + Sync {
    fn calculate(&self, answers: &AssessmentAnswers) -> PricingBreakdown;
}

/// The rule-table-backed engine. Stateless after construction; every call is
/// a pure computation over the answers and the static tables, so concurrent
/// requests share one instance without synchronization.
#[derive(Clone, Debug)]
pub struct DeterministicPricingEngine {
    registry: FeatureRegistry,
    modifiers: ModifierTable,
    bundles: BundleTable,
}

impl DeterministicPricingEngine {
    /// Build an engine, validating the tables. Table defects are deployment
    /// errors and must abort startup rather than surface per-request.
    pub fn new(
        registry: FeatureRegistry,
        modifiers: ModifierTable,
        bundles: BundleTable,
    ) -> Result<Self, RuleTableError> {
        registry.validate()?;
        modifiers.validate(&registry)?;
        bundles.validate(&registry)?;
        Ok(Self { registry, modifiers, bundles })
    }

    pub fn standard() -> Result<Self, RuleTableError> {
        Self::new(FeatureRegistry::standard(), ModifierTable::standard(), BundleTable::standard())
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Normalize the answer set into canonical feature ids: the multi-select
    /// labels plus the answer-derived options (rush timeline, premium design
    /// tier, integration needs).
    pub fn normalized_features(&self, answers: &AssessmentAnswers) -> BTreeSet<FeatureId> {
        let mut candidates: Vec<String> =
            answers.feature_labels().iter().cloned().collect();

        if let Some(timeline) = answers.timeline() {
            candidates.push(timeline.to_string());
        }
        if let Some(tier) = answers.design_tier() {
            candidates.push(tier.to_string());
        }
        if !answers.integrations().is_empty() {
            candidates.push("api-integration".to_string());
        }

        self.registry.normalize_set(candidates)
    }

    fn display_label(&self, feature: &FeatureId, overridden: &Option<String>) -> String {
        overridden
            .clone()
            .or_else(|| self.registry.display_name(feature).map(str::to_string))
            .unwrap_or_else(|| feature.to_string())
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn calculate(&self, answers: &AssessmentAnswers) -> PricingBreakdown {
        let base = rates::base_for(answers.project_type());
        let features = self.normalized_features(answers);
        let rules = self.modifiers.applicable(&features, answers);
        let bundles = self.bundles.applicable(&features);

        let mut line_items = vec![LineItem {
            label: format!("Base Price ({} tier)", base.project_type),
            amount: base.base_price,
            kind: LineItemKind::Base,
        }];

        // Pass 1: flat feature surcharges.
        let mut additive_total = base.base_price;
        for rule in rules.iter().filter(|rule| rule.kind == ModifierKind::Additive) {
            additive_total += rule.value;
            line_items.push(LineItem {
                label: self.display_label(&rule.feature, &rule.label),
                amount: rule.value,
                kind: LineItemKind::Additive,
            });
        }

        // Pass 2: bundle adjustments. Additive bundles move the subtotal
        // base; multiplicative bundles queue up behind the modifier scaling.
        let mut deferred_multipliers: Vec<(String, Decimal)> = Vec::new();
        for bundle in &bundles {
            match bundle.kind {
                ModifierKind::Additive => {
                    additive_total += bundle.value;
                    line_items.push(LineItem {
                        label: bundle.label.clone(),
                        amount: bundle.value,
                        kind: LineItemKind::Bundle,
                    });
                }
                ModifierKind::Multiplicative => {
                    deferred_multipliers.push((bundle.label.clone(), bundle.value));
                }
            }
        }

        // Pass 3: multiplicative scaling. Each line item carries the
        // sequential monetary effect so the items sum back to the subtotal.
        let mut total_multiplier = Decimal::ONE;
        let mut running = additive_total;
        for rule in rules.iter().filter(|rule| rule.kind == ModifierKind::Multiplicative) {
            let factor = Decimal::ONE + rule.value;
            total_multiplier *= factor;
            let scaled = running * factor;
            line_items.push(LineItem {
                label: self.display_label(&rule.feature, &rule.label),
                amount: scaled - running,
                kind: LineItemKind::Multiplicative,
            });
            running = scaled;
        }
        for (label, value) in deferred_multipliers {
            let factor = Decimal::ONE + value;
            total_multiplier *= factor;
            let scaled = running * factor;
            line_items.push(LineItem {
                label,
                amount: scaled - running,
                kind: LineItemKind::Bundle,
            });
            running = scaled;
        }

        // Pass 4: complexity tier scaling from the base price table.
        if base.complexity_multiplier != Decimal::ONE {
            let scaled = running * base.complexity_multiplier;
            line_items.push(LineItem {
                label: format!("Complexity Scaling (x{})", base.complexity_multiplier),
                amount: scaled - running,
                kind: LineItemKind::Complexity,
            });
            running = scaled;
        }

        let subtotal = round_currency(running);

        PricingBreakdown {
            base_price: base.base_price,
            line_items,
            subtotal,
            total_multiplier,
            estimated_range: EstimatedRange::around(subtotal),
        }
    }
}

static STANDARD_ENGINE: OnceLock<DeterministicPricingEngine> = OnceLock::new();

/// Shared engine over the built-in tables.
///
/// The built-in tables are covered by table-validation tests; a failure here
/// means the binary shipped with a malformed table, which is exactly the
/// fatal-at-startup case.
pub fn standard_engine() -> &'static DeterministicPricingEngine {
    STANDARD_ENGINE.get_or_init(|| {
        DeterministicPricingEngine::standard()
            .expect("built-in pricing tables failed validation at startup")
    })
}

/// Price a set of questionnaire answers with the standard tables.
///
/// Deterministic and side-effect-free: identical answers always produce an
/// identical breakdown, which is what lets the wizard recalculate on every
/// step change and replace the stored breakdown wholesale.
pub fn calculate_pricing(answers: &AssessmentAnswers) -> PricingBreakdown {
    standard_engine().calculate(answers)
}
