use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use estimo_core::domain::answers::AssessmentAnswers;
use estimo_core::domain::assessment::{AssessmentId, AssessmentStatus, ProjectAssessment};
use estimo_core::pricing::breakdown::PricingBreakdown;

use super::{AssessmentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlAssessmentRepository {
    pool: DbPool,
}

impl SqlAssessmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_row(row: &SqliteRow) -> Result<ProjectAssessment, RepositoryError> {
    let id: String = row.get("id");
    let answers_json: String = row.get("answers");
    let pricing_json: Option<String> = row.get("pricing");
    let status_text: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let answers: AssessmentAnswers = serde_json::from_str(&answers_json)
        .map_err(|error| RepositoryError::Decode(format!("answers for `{id}`: {error}")))?;
    let pricing: Option<PricingBreakdown> = pricing_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|error| RepositoryError::Decode(format!("pricing for `{id}`: {error}")))?;
    let status: AssessmentStatus = status_text
        .parse()
        .map_err(|error| RepositoryError::Decode(format!("status for `{id}`: {error}")))?;

    Ok(ProjectAssessment {
        id: AssessmentId(id.clone()),
        answers,
        pricing,
        status,
        created_at: parse_timestamp(&id, "created_at", &created_at)?,
        updated_at: parse_timestamp(&id, "updated_at", &updated_at)?,
    })
}

fn parse_timestamp(
    id: &str,
    column: &str,
    value: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column} for `{id}`: {error}")))
}

fn encode_json<T: serde::Serialize>(
    id: &AssessmentId,
    value: &T,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|error| RepositoryError::Decode(format!("encode for `{id}`: {error}")))
}

#[async_trait::async_trait]
impl AssessmentRepository for SqlAssessmentRepository {
    async fn find_by_id(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<ProjectAssessment>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, answers, pricing, status, created_at, updated_at \
             FROM project_assessment WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn save(&self, assessment: &ProjectAssessment) -> Result<(), RepositoryError> {
        let answers = encode_json(&assessment.id, &assessment.answers)?;
        let pricing = assessment
            .pricing
            .as_ref()
            .map(|breakdown| encode_json(&assessment.id, breakdown))
            .transpose()?;

        sqlx::query(
            "INSERT INTO project_assessment (id, answers, pricing, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(id) DO UPDATE SET \
                 answers = excluded.answers, \
                 pricing = excluded.pricing, \
                 status = excluded.status, \
                 updated_at = excluded.updated_at",
        )
        .bind(assessment.id.as_str())
        .bind(answers)
        .bind(pricing)
        .bind(assessment.status.as_str())
        .bind(assessment.created_at.to_rfc3339())
        .bind(assessment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_pricing(
        &self,
        id: &AssessmentId,
        answers: &AssessmentAnswers,
        breakdown: &PricingBreakdown,
    ) -> Result<Option<ProjectAssessment>, RepositoryError> {
        let answers_json = encode_json(id, answers)?;
        let pricing_json = encode_json(id, breakdown)?;

        let updated = sqlx::query(
            "UPDATE project_assessment \
             SET answers = ?2, pricing = ?3, updated_at = ?4 \
             WHERE id = ?1",
        )
        .bind(id.as_str())
        .bind(answers_json)
        .bind(pricing_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn list(
        &self,
        status: Option<AssessmentStatus>,
    ) -> Result<Vec<ProjectAssessment>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT id, answers, pricing, status, created_at, updated_at \
                     FROM project_assessment WHERE status = ?1 ORDER BY created_at DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, answers, pricing, status, created_at, updated_at \
                     FROM project_assessment ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(decode_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use estimo_core::domain::answers::{keys, AnswerValue, AssessmentAnswers};
    use estimo_core::domain::assessment::{AssessmentStatus, ProjectAssessment};
    use estimo_core::pricing::engine::calculate_pricing;

    use crate::repositories::{AssessmentRepository, SqlAssessmentRepository};
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlAssessmentRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory database should connect");
        migrations::run_pending(&pool).await.expect("migrations apply");
        SqlAssessmentRepository::new(pool)
    }

    fn assessment_fixture() -> ProjectAssessment {
        let mut answers = AssessmentAnswers::new();
        answers.insert(keys::PROJECT_TYPE, AnswerValue::Text("web-app".to_string()));
        answers.insert(
            keys::FEATURES,
            AnswerValue::Many(vec!["Shopping Cart".to_string(), "Search".to_string()]),
        );

        let mut assessment = ProjectAssessment::new(answers);
        assessment.replace_pricing(calculate_pricing(&assessment.answers));
        assessment
    }

    #[tokio::test]
    async fn save_and_find_round_trips_the_record() {
        let repository = repository().await;
        let assessment = assessment_fixture();

        repository.save(&assessment).await.expect("save");
        let loaded = repository
            .find_by_id(&assessment.id)
            .await
            .expect("find")
            .expect("record should exist");

        assert_eq!(loaded.answers, assessment.answers);
        assert_eq!(loaded.pricing, assessment.pricing);
        assert_eq!(loaded.status, AssessmentStatus::Pending);
    }

    #[tokio::test]
    async fn update_pricing_replaces_the_stored_breakdown() {
        let repository = repository().await;
        let assessment = assessment_fixture();
        repository.save(&assessment).await.expect("save");

        let mut edited = assessment.answers.clone();
        edited.insert(
            keys::FEATURES,
            AnswerValue::Many(vec!["Shopping Cart".to_string(), "Payment Processing".to_string()]),
        );
        let recalculated = calculate_pricing(&edited);

        let updated = repository
            .update_pricing(&assessment.id, &edited, &recalculated)
            .await
            .expect("update")
            .expect("record should exist");

        assert_eq!(updated.answers, edited);
        assert_eq!(updated.pricing.as_ref(), Some(&recalculated));
        assert_ne!(updated.pricing, assessment.pricing);
    }

    #[tokio::test]
    async fn update_pricing_for_unknown_id_returns_none() {
        let repository = repository().await;
        let assessment = assessment_fixture();
        let breakdown = calculate_pricing(&assessment.answers);

        let updated = repository
            .update_pricing(&assessment.id, &assessment.answers, &breakdown)
            .await
            .expect("update should not error");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let repository = repository().await;

        let pending = assessment_fixture();
        repository.save(&pending).await.expect("save pending");

        let mut reviewed = assessment_fixture();
        reviewed.transition_to(AssessmentStatus::Reviewed).expect("transition");
        repository.save(&reviewed).await.expect("save reviewed");

        let all = repository.list(None).await.expect("list all");
        assert_eq!(all.len(), 2);

        let only_reviewed =
            repository.list(Some(AssessmentStatus::Reviewed)).await.expect("list reviewed");
        assert_eq!(only_reviewed.len(), 1);
        assert_eq!(only_reviewed[0].id, reviewed.id);
    }
}
