//! Deterministic suggestion assembly and the prompt fact block.

use crate::proposal::facts::ProposalFacts;

/// Suggestions rendered purely from the fact sheet. This is both the offline
/// path and the recovery path when the text-generation collaborator is
/// down; it must always return at least one entry.
pub fn fallback_suggestions(facts: &ProposalFacts) -> Vec<String> {
    let mut suggestions = Vec::new();

    suggestions.push(format!(
        "Scope a {} build around {} core capabilit{}: {}.",
        facts.project_type,
        facts.feature_names.len().max(1),
        if facts.feature_names.len() == 1 { "y" } else { "ies" },
        if facts.feature_names.is_empty() {
            "to be confirmed during discovery".to_string()
        } else {
            facts.feature_names.join(", ")
        },
    ));

    suggestions.push(format!("Budget guidance: {}.", facts.price_summary()));

    if let Some(timeline) = &facts.timeline {
        suggestions.push(format!(
            "Plan delivery against the stated `{timeline}` timeline, with milestones per feature group."
        ));
    }

    if !facts.integrations.is_empty() {
        suggestions.push(format!(
            "Confirm API contracts early for: {}.",
            facts.integrations.join(", ")
        ));
    }

    if facts.feature_names.iter().any(|name| name == "Payment Processing") {
        suggestions.push(
            "Schedule a compliance review before launch; payment flows need it.".to_string(),
        );
    }

    suggestions
}

/// The structured block handed to the text-generation collaborator. Prompt
/// engineering lives with the caller; this is only the facts it must narrate.
pub fn suggestion_fact_block(facts: &ProposalFacts) -> String {
    let mut lines = vec![
        format!("project_type: {}", facts.project_type),
        format!(
            "features: {}",
            if facts.feature_names.is_empty() {
                "(none selected)".to_string()
            } else {
                facts.feature_names.join(", ")
            }
        ),
        format!(
            "price_range: {} / {} / {}",
            facts.breakdown.estimated_range.low,
            facts.breakdown.estimated_range.average,
            facts.breakdown.estimated_range.high,
        ),
    ];

    if let Some(timeline) = &facts.timeline {
        lines.push(format!("timeline: {timeline}"));
    }
    if let Some(budget_band) = &facts.budget_band {
        lines.push(format!("budget_band: {budget_band}"));
    }
    if !facts.integrations.is_empty() {
        lines.push(format!("integrations: {}", facts.integrations.join(", ")));
    }

    lines.join("\n")
}
