//! Structured fact sheet handed to the prose layer.
//!
//! Numbers and feature selections are decided here, by the deterministic
//! engine; the text-generation collaborator only narrates them.

use serde::{Deserialize, Serialize};

use crate::domain::answers::AssessmentAnswers;
use crate::pricing::breakdown::PricingBreakdown;
use crate::pricing::engine::{standard_engine, PricingEngine};
use crate::pricing::rates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalFacts {
    pub project_type: String,
    pub feature_names: Vec<String>,
    pub timeline: Option<String>,
    pub budget_band: Option<String>,
    pub integrations: Vec<String>,
    pub breakdown: PricingBreakdown,
}

impl ProposalFacts {
    /// Compose the fact sheet with the standard engine and tables.
    pub fn compose(answers: &AssessmentAnswers) -> Self {
        let engine = standard_engine();
        let breakdown = engine.calculate(answers);
        let features = engine.normalized_features(answers);

        // Display names in registry registration order, matching the
        // line-item listing.
        let feature_names = engine
            .registry()
            .entries()
            .iter()
            .filter(|entry| features.contains(&entry.id))
            .map(|entry| entry.label.clone())
            .collect();

        Self {
            project_type: rates::base_for(answers.project_type()).project_type,
            feature_names,
            timeline: answers.timeline().map(str::to_string),
            budget_band: answers.budget_band().map(str::to_string),
            integrations: answers.integrations().to_vec(),
            breakdown,
        }
    }

    /// One-line price summary used by both prompts and fallbacks.
    pub fn price_summary(&self) -> String {
        format!(
            "estimated {} to {}, averaging {}",
            self.breakdown.estimated_range.low,
            self.breakdown.estimated_range.high,
            self.breakdown.estimated_range.average,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::answers::{keys, AnswerValue, AssessmentAnswers};

    use super::ProposalFacts;

    #[test]
    fn facts_list_features_by_display_name() {
        let mut answers = AssessmentAnswers::new();
        answers.insert(keys::PROJECT_TYPE, AnswerValue::Text("web-app".to_string()));
        answers.insert(
            keys::FEATURES,
            AnswerValue::Many(vec!["payments".to_string(), "cart".to_string()]),
        );

        let facts = ProposalFacts::compose(&answers);

        assert_eq!(facts.project_type, "web-app");
        assert_eq!(facts.feature_names, ["Shopping Cart", "Payment Processing"]);
    }

    #[test]
    fn facts_survive_empty_answers() {
        let facts = ProposalFacts::compose(&AssessmentAnswers::new());

        assert_eq!(facts.project_type, "custom");
        assert!(facts.feature_names.is_empty());
        assert!(facts.price_summary().contains("averaging"));
    }
}
