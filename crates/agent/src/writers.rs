//! Suggestion and proposal writers.
//!
//! Each writer composes the fact sheet, asks the generator to narrate it,
//! and degrades to the deterministic fallback from `estimo-core` on any
//! failure. Callers never see an error from the narration path.

use chrono::Utc;
use tera::Tera;
use tracing::warn;

use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::domain::assessment::AssessmentId;
use estimo_core::proposal::{
    fallback_proposal, fallback_suggestions, suggestion_fact_block, ProposalDocument,
    ProposalFacts, ProposalSource,
};

use crate::llm::TextGenerator;

pub struct SuggestionWriter<G> {
    generator: G,
}

impl<G> SuggestionWriter<G>
where
    G: TextGenerator,
{
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Ordered project suggestions for an answer set. Best-effort by
    /// contract: a generator failure yields the templated list, never an
    /// error.
    pub async fn generate(&self, answers: &AssessmentAnswers) -> Vec<String> {
        let facts = ProposalFacts::compose(answers);
        let prompt = suggestion_prompt(&facts);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let suggestions = parse_suggestion_lines(&text);
                if suggestions.is_empty() {
                    warn!(
                        event_name = "agent.suggestions.empty_response",
                        correlation_id = "suggestions",
                        "generator returned no usable lines, using templated fallback"
                    );
                    fallback_suggestions(&facts)
                } else {
                    suggestions
                }
            }
            Err(error) => {
                warn!(
                    event_name = "agent.suggestions.generator_failed",
                    correlation_id = "suggestions",
                    error = %error,
                    "text generation failed, using templated fallback"
                );
                fallback_suggestions(&facts)
            }
        }
    }
}

pub struct ProposalWriter<G> {
    generator: G,
    templates: Tera,
}

impl<G> ProposalWriter<G>
where
    G: TextGenerator,
{
    pub fn new(generator: G) -> Self {
        let mut templates = Tera::default();
        if let Err(error) =
            templates.add_raw_template("proposal.md", include_str!("../templates/proposal.md"))
        {
            warn!(
                event_name = "agent.proposal.template_load_failed",
                correlation_id = "proposal",
                error = %error,
                "embedded proposal template failed to load, markdown rendering will use the plain layout"
            );
        }

        Self { generator, templates }
    }

    /// Draft proposal for an assessment. The generator supplies the summary
    /// prose; scope items, ranges, and the timeline always come from the
    /// fact sheet.
    pub async fn generate(
        &self,
        answers: &AssessmentAnswers,
        assessment_id: AssessmentId,
    ) -> ProposalDocument {
        let facts = ProposalFacts::compose(answers);
        let template = fallback_proposal(&facts, assessment_id);

        match self.generator.generate(&proposal_prompt(&facts)).await {
            Ok(text) if !text.trim().is_empty() => ProposalDocument {
                summary: text.trim().to_string(),
                source: ProposalSource::Assistant,
                generated_at: Utc::now(),
                ..template
            },
            Ok(_) => template,
            Err(error) => {
                warn!(
                    event_name = "agent.proposal.generator_failed",
                    correlation_id = "proposal",
                    assessment_id = %template.assessment_id,
                    error = %error,
                    "text generation failed, returning templated proposal"
                );
                template
            }
        }
    }

    /// Render a proposal document as markdown for download or email.
    pub fn render_markdown(&self, document: &ProposalDocument) -> String {
        let mut context = tera::Context::new();
        context.insert("title", &document.title);
        context.insert("summary", &document.summary);
        context.insert("scope_items", &document.scope_items);
        context.insert("range", &document.estimated_range);
        context.insert("timeline", &document.timeline);

        match self.templates.render("proposal.md", &context) {
            Ok(rendered) => rendered,
            Err(error) => {
                warn!(
                    event_name = "agent.proposal.render_failed",
                    correlation_id = "proposal",
                    error = %error,
                    "template rendering failed, using plain layout"
                );
                plain_markdown(document)
            }
        }
    }
}

fn suggestion_prompt(facts: &ProposalFacts) -> String {
    format!(
        "You are drafting project suggestions for a software agency's assessment wizard.\n\
         Write 3-5 short, concrete suggestions, one per line, grounded ONLY in these facts:\n\n{}",
        suggestion_fact_block(facts)
    )
}

fn proposal_prompt(facts: &ProposalFacts) -> String {
    format!(
        "Write a two-paragraph proposal summary for a prospective client.\n\
         Do not invent numbers; use ONLY these facts:\n\n{}",
        suggestion_fact_block(facts)
    )
}

fn parse_suggestion_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim_start_matches(|ch: char| ch.is_ascii_digit() || ch == '.' || ch == ')')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn plain_markdown(document: &ProposalDocument) -> String {
    let mut lines = vec![format!("# {}", document.title), String::new(), document.summary.clone()];
    lines.push(String::new());
    for item in &document.scope_items {
        lines.push(format!("- {item}"));
    }
    lines.push(format!(
        "\nInvestment: {} / {} / {}",
        document.estimated_range.low, document.estimated_range.average, document.estimated_range.high
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use estimo_core::domain::answers::{keys, AnswerValue, AssessmentAnswers};
    use estimo_core::domain::assessment::AssessmentId;
    use estimo_core::proposal::ProposalSource;

    use crate::llm::{TextGenerator, UnavailableTextGenerator};

    use super::{parse_suggestion_lines, ProposalWriter, SuggestionWriter};

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn answers() -> AssessmentAnswers {
        let mut answers = AssessmentAnswers::new();
        answers.insert(keys::PROJECT_TYPE, AnswerValue::Text("web-app".to_string()));
        answers.insert(
            keys::FEATURES,
            AnswerValue::Many(vec!["Payment Processing".to_string()]),
        );
        answers
    }

    #[tokio::test]
    async fn failed_generator_still_returns_suggestions() {
        let writer = SuggestionWriter::new(UnavailableTextGenerator::new("provider offline"));

        let suggestions = writer.generate(&answers()).await;

        assert!(!suggestions.is_empty(), "fallback suggestions must not be empty");
    }

    #[tokio::test]
    async fn generator_lines_are_parsed_and_cleaned() {
        let writer = SuggestionWriter::new(CannedGenerator(
            "- Ship an MVP checkout first\n\n2. Add fraud review later\n",
        ));

        let suggestions = writer.generate(&answers()).await;

        assert_eq!(
            suggestions,
            ["Ship an MVP checkout first", "Add fraud review later"]
        );
    }

    #[tokio::test]
    async fn blank_generator_output_falls_back() {
        let writer = SuggestionWriter::new(CannedGenerator("   \n  \n"));

        let suggestions = writer.generate(&answers()).await;

        assert!(!suggestions.is_empty());
    }

    #[tokio::test]
    async fn proposal_marks_its_source() {
        let narrated = ProposalWriter::new(CannedGenerator("A confident two-paragraph summary."))
            .generate(&answers(), AssessmentId("asm_a".to_string()))
            .await;
        assert_eq!(narrated.source, ProposalSource::Assistant);
        assert_eq!(narrated.summary, "A confident two-paragraph summary.");

        let templated = ProposalWriter::new(UnavailableTextGenerator::new("offline"))
            .generate(&answers(), AssessmentId("asm_b".to_string()))
            .await;
        assert_eq!(templated.source, ProposalSource::Template);
        assert!(!templated.scope_items.is_empty());
    }

    #[tokio::test]
    async fn markdown_rendering_includes_scope_and_range() {
        let writer = ProposalWriter::new(UnavailableTextGenerator::new("offline"));
        let document = writer.generate(&answers(), AssessmentId("asm_c".to_string())).await;

        let markdown = writer.render_markdown(&document);

        assert!(markdown.contains("# Project Proposal"));
        assert!(markdown.contains("Payment Processing"));
        assert!(markdown.contains(&document.estimated_range.average.to_string()));
    }

    #[test]
    fn line_parsing_strips_bullets_and_numbering() {
        let parsed = parse_suggestion_lines("• one\n- two\n3. three\n   \n");
        assert_eq!(parsed, ["one", "two", "three"]);
    }
}
