use async_trait::async_trait;
use thiserror::Error;

use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::domain::assessment::{AssessmentId, AssessmentStatus, ProjectAssessment};
use estimo_core::pricing::breakdown::PricingBreakdown;

pub mod assessment;
pub mod memory;

pub use assessment::SqlAssessmentRepository;
pub use memory::InMemoryAssessmentRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Storage contract for assessments. The pricing engine only ever produces
/// breakdowns; this boundary owns identity, persistence, and listing.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<ProjectAssessment>, RepositoryError>;

    /// Insert or fully replace an assessment record.
    async fn save(&self, assessment: &ProjectAssessment) -> Result<(), RepositoryError>;

    /// Replace the answers and breakdown of an existing assessment, returning
    /// the updated record, or `None` when the id is unknown.
    async fn update_pricing(
        &self,
        id: &AssessmentId,
        answers: &AssessmentAnswers,
        breakdown: &PricingBreakdown,
    ) -> Result<Option<ProjectAssessment>, RepositoryError>;

    /// Newest-first listing, optionally filtered by triage status.
    async fn list(
        &self,
        status: Option<AssessmentStatus>,
    ) -> Result<Vec<ProjectAssessment>, RepositoryError>;
}
