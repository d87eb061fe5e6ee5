//! Suggestion and proposal assembly.
//!
//! Composes the normalized feature set and the pricing breakdown into a
//! structured fact sheet, the deterministic fallback suggestions, and a
//! draft proposal document. Prose generation belongs to the external
//! text-generation collaborator (see the agent crate); everything here works
//! without it.

pub mod facts;
pub mod suggestions;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::assessment::AssessmentId;
use crate::pricing::breakdown::EstimatedRange;

pub use facts::ProposalFacts;
pub use suggestions::{fallback_suggestions, suggestion_fact_block};

/// Where a proposal's prose came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSource {
    /// Narrated by the text-generation collaborator.
    Assistant,
    /// Assembled from the fact-sheet template, no external call involved.
    Template,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    pub assessment_id: AssessmentId,
    pub title: String,
    pub summary: String,
    pub scope_items: Vec<String>,
    pub estimated_range: EstimatedRange,
    pub timeline: Option<String>,
    pub source: ProposalSource,
    pub generated_at: DateTime<Utc>,
}

/// Build the draft proposal without any external collaborator: a titled
/// summary plus one scope item per selected feature.
pub fn fallback_proposal(facts: &ProposalFacts, assessment_id: AssessmentId) -> ProposalDocument {
    let scope_items = if facts.feature_names.is_empty() {
        vec!["Discovery workshop to confirm scope".to_string()]
    } else {
        facts
            .feature_names
            .iter()
            .map(|name| format!("Design and build: {name}"))
            .collect()
    };

    let summary = format!(
        "Proposed {} engagement covering {} scope item(s), {}.",
        facts.project_type,
        scope_items.len(),
        facts.price_summary(),
    );

    ProposalDocument {
        assessment_id,
        title: format!("Project Proposal: {}", facts.project_type),
        summary,
        scope_items,
        estimated_range: facts.breakdown.estimated_range.clone(),
        timeline: facts.timeline.clone(),
        source: ProposalSource::Template,
        generated_at: Utc::now(),
    }
}
