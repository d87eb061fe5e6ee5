//! In-memory repository used by unit tests and the CLI smoke path.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::domain::assessment::{AssessmentId, AssessmentStatus, ProjectAssessment};
use estimo_core::pricing::breakdown::PricingBreakdown;

use super::{AssessmentRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryAssessmentRepository {
    records: RwLock<HashMap<String, ProjectAssessment>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn find_by_id(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<ProjectAssessment>, RepositoryError> {
        Ok(self.records.read().await.get(id.as_str()).cloned())
    }

    async fn save(&self, assessment: &ProjectAssessment) -> Result<(), RepositoryError> {
        self.records.write().await.insert(assessment.id.0.clone(), assessment.clone());
        Ok(())
    }

    async fn update_pricing(
        &self,
        id: &AssessmentId,
        answers: &AssessmentAnswers,
        breakdown: &PricingBreakdown,
    ) -> Result<Option<ProjectAssessment>, RepositoryError> {
        let mut records = self.records.write().await;
        match records.get_mut(id.as_str()) {
            Some(record) => {
                record.answers = answers.clone();
                record.pricing = Some(breakdown.clone());
                record.updated_at = Utc::now();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        status: Option<AssessmentStatus>,
    ) -> Result<Vec<ProjectAssessment>, RepositoryError> {
        let records = self.records.read().await;
        let mut matching: Vec<ProjectAssessment> = records
            .values()
            .filter(|record| status.map(|wanted| record.status == wanted).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use estimo_core::domain::answers::{keys, AnswerValue, AssessmentAnswers};
    use estimo_core::domain::assessment::ProjectAssessment;
    use estimo_core::pricing::engine::calculate_pricing;

    use crate::repositories::AssessmentRepository;

    use super::InMemoryAssessmentRepository;

    #[tokio::test]
    async fn behaves_like_the_sql_repository_for_the_update_path() {
        let repository = InMemoryAssessmentRepository::new();

        let mut answers = AssessmentAnswers::new();
        answers.insert(keys::PROJECT_TYPE, AnswerValue::Text("marketing-site".to_string()));
        let assessment = ProjectAssessment::new(answers.clone());
        repository.save(&assessment).await.expect("save");

        answers.insert(keys::FEATURES, AnswerValue::Many(vec!["SEO".to_string()]));
        let breakdown = calculate_pricing(&answers);
        let updated = repository
            .update_pricing(&assessment.id, &answers, &breakdown)
            .await
            .expect("update")
            .expect("record exists");

        assert_eq!(updated.pricing, Some(breakdown));
        assert_eq!(updated.answers, answers);
    }
}
