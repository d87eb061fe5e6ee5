use std::fs;
use std::path::Path;

use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::pricing::breakdown::PricingBreakdown;
use estimo_core::pricing::engine::calculate_pricing;
use estimo_core::proposal::{fallback_suggestions, ProposalFacts};

use crate::commands::CommandResult;

pub fn run(file: &Path, json_output: bool) -> CommandResult {
    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "estimate",
                "read_file",
                format!("could not read `{}`: {error}", file.display()),
                2,
            );
        }
    };

    let answers: AssessmentAnswers = match serde_json::from_str(&raw) {
        Ok(answers) => answers,
        Err(error) => {
            return CommandResult::failure(
                "estimate",
                "parse_answers",
                format!("`{}` is not a valid answers object: {error}", file.display()),
                3,
            );
        }
    };

    let breakdown = calculate_pricing(&answers);

    if json_output {
        return match serde_json::to_string_pretty(&breakdown) {
            Ok(json) => CommandResult { exit_code: 0, output: json },
            Err(error) => CommandResult::failure(
                "estimate",
                "serialization",
                format!("could not serialize breakdown: {error}"),
                4,
            ),
        };
    }

    CommandResult { exit_code: 0, output: render_human(&answers, &breakdown) }
}

fn render_human(answers: &AssessmentAnswers, breakdown: &PricingBreakdown) -> String {
    let mut lines = vec!["estimate:".to_string()];

    for item in &breakdown.line_items {
        lines.push(format!(
            "  {:<44} {:>10}",
            item.label,
            item.amount.round_dp(2).to_string()
        ));
    }
    lines.push(format!("  {:<44} {:>10}", "subtotal", breakdown.subtotal.to_string()));
    lines.push(format!(
        "  range: {} to {} (avg {})",
        breakdown.estimated_range.low,
        breakdown.estimated_range.high,
        breakdown.estimated_range.average,
    ));

    let facts = ProposalFacts::compose(answers);
    lines.push(String::new());
    lines.push("suggestions:".to_string());
    for suggestion in fallback_suggestions(&facts) {
        lines.push(format!("  - {suggestion}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::run;

    #[test]
    fn estimates_a_valid_answers_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("answers.json");
        fs::write(
            &path,
            r#"{"project_type": "web-app", "features": ["Shopping Cart", "Payment Processing"]}"#,
        )
        .expect("write answers");

        let result = run(&path, false);

        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("Shopping Cart"));
        assert!(result.output.contains("range:"));
    }

    #[test]
    fn json_mode_emits_the_breakdown_shape() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"project_type": "quantum-widget"}"#).expect("write answers");

        let result = run(&path, true);

        assert_eq!(result.exit_code, 0);
        let value: serde_json::Value =
            serde_json::from_str(&result.output).expect("output should be json");
        assert!(value.get("estimatedRange").is_some());
    }

    #[test]
    fn malformed_answers_fail_with_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("answers.json");
        fs::write(&path, "not json").expect("write answers");

        let result = run(&path, false);

        assert_eq!(result.exit_code, 3);
        assert!(result.output.contains("parse_answers"));
    }
}
