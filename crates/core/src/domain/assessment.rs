use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::answers::AssessmentAnswers;
use crate::errors::DomainError;
use crate::pricing::breakdown::PricingBreakdown;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn generate() -> Self {
        Self(format!("asm_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Pending,
    Reviewed,
    Contacted,
    Archived,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Pending => "pending",
            AssessmentStatus::Reviewed => "reviewed",
            AssessmentStatus::Contacted => "contacted",
            AssessmentStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "contacted" => Ok(Self::Contacted),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown assessment status `{other}`"
            ))),
        }
    }
}

/// A stored project assessment: the answer set, the latest breakdown, and
/// the back-office triage status.
///
/// The pricing engine never mutates one of these in place. Recalculation
/// builds a fresh [`PricingBreakdown`] that replaces `pricing` wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectAssessment {
    pub id: AssessmentId,
    pub answers: AssessmentAnswers,
    pub pricing: Option<PricingBreakdown>,
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectAssessment {
    pub fn new(answers: AssessmentAnswers) -> Self {
        let now = Utc::now();
        Self {
            id: AssessmentId::generate(),
            answers,
            pricing: None,
            status: AssessmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_transition_to(&self, next: AssessmentStatus) -> bool {
        matches!(
            (self.status, next),
            (AssessmentStatus::Pending, AssessmentStatus::Reviewed)
                | (AssessmentStatus::Reviewed, AssessmentStatus::Contacted)
                | (_, AssessmentStatus::Archived)
        )
    }

    pub fn transition_to(&mut self, next: AssessmentStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidStatusTransition { from: self.status, to: next })
    }

    /// Swap in a freshly computed breakdown after an answer edit.
    pub fn replace_pricing(&mut self, breakdown: PricingBreakdown) {
        self.pricing = Some(breakdown);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::answers::{keys, AnswerValue, AssessmentAnswers};
    use crate::pricing::engine::calculate_pricing;

    use super::{AssessmentStatus, ProjectAssessment};

    fn assessment(status: AssessmentStatus) -> ProjectAssessment {
        let mut answers = AssessmentAnswers::new();
        answers.insert(keys::PROJECT_TYPE, AnswerValue::Text("web-app".to_string()));
        let mut assessment = ProjectAssessment::new(answers);
        assessment.status = status;
        assessment
    }

    #[test]
    fn allows_triage_progression() {
        let mut assessment = assessment(AssessmentStatus::Pending);
        assessment.transition_to(AssessmentStatus::Reviewed).expect("pending -> reviewed");
        assessment.transition_to(AssessmentStatus::Contacted).expect("reviewed -> contacted");
        assert_eq!(assessment.status, AssessmentStatus::Contacted);
    }

    #[test]
    fn blocks_skipping_review() {
        let mut assessment = assessment(AssessmentStatus::Pending);
        let error = assessment
            .transition_to(AssessmentStatus::Contacted)
            .expect_err("pending -> contacted should fail");
        assert!(matches!(error, crate::errors::DomainError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn any_status_can_be_archived() {
        for status in [
            AssessmentStatus::Pending,
            AssessmentStatus::Reviewed,
            AssessmentStatus::Contacted,
        ] {
            let mut assessment = assessment(status);
            assessment.transition_to(AssessmentStatus::Archived).expect("archive");
            assert_eq!(assessment.status, AssessmentStatus::Archived);
        }
    }

    #[test]
    fn replacing_pricing_bumps_updated_at() {
        let mut assessment = assessment(AssessmentStatus::Pending);
        let before = assessment.updated_at;
        assessment.replace_pricing(calculate_pricing(&assessment.answers));
        assert!(assessment.pricing.is_some());
        assert!(assessment.updated_at >= before);
    }
}
