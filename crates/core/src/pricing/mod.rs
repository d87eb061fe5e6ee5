//! The project-assessment pricing pipeline.
//!
//! Answers flow through feature normalization, the base price lookup, the
//! modifier rules, the bundle pass, and range estimation, producing a
//! [`PricingBreakdown`](breakdown::PricingBreakdown). Every stage is
//! deterministic; the only inputs are the answer set and the static tables
//! validated at startup.

pub mod breakdown;
pub mod engine;
pub mod modifiers;
pub mod rates;
pub mod registry;

pub use breakdown::{EstimatedRange, LineItem, LineItemKind, PricingBreakdown};
pub use engine::{calculate_pricing, standard_engine, DeterministicPricingEngine, PricingEngine};
pub use modifiers::{BundleRule, BundleTable, ModifierKind, ModifierRule, ModifierTable, RuleCondition};
pub use rates::{base_for, BaseRate, DEFAULT_PROJECT_TYPE};
pub use registry::{FeatureEntry, FeatureRegistry, RuleTableError};
