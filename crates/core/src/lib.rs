pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod proposal;

pub use domain::answers::{AnswerValue, AssessmentAnswers};
pub use domain::assessment::{AssessmentId, AssessmentStatus, ProjectAssessment};
pub use domain::feature::FeatureId;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    calculate_pricing, standard_engine, DeterministicPricingEngine, EstimatedRange, LineItem,
    LineItemKind, PricingBreakdown, PricingEngine, RuleTableError,
};
pub use proposal::{
    fallback_proposal, fallback_suggestions, suggestion_fact_block, ProposalDocument,
    ProposalFacts, ProposalSource,
};
