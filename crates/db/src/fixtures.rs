//! Deterministic demo fixtures for local development and the CLI `seed`
//! command.

use estimo_core::domain::answers::{keys, AnswerValue, AssessmentAnswers};
use estimo_core::domain::assessment::ProjectAssessment;
use estimo_core::pricing::engine::calculate_pricing;

use crate::repositories::{AssessmentRepository, RepositoryError, SqlAssessmentRepository};
use crate::DbPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
}

/// Three representative assessments: a commerce build, a rushed mobile app,
/// and a barely-started wizard session.
pub fn demo_assessments() -> Vec<ProjectAssessment> {
    let mut records = Vec::new();

    let mut commerce = AssessmentAnswers::new();
    commerce.insert(keys::PROJECT_TYPE, AnswerValue::Text("e-commerce".to_string()));
    commerce.insert(
        keys::FEATURES,
        AnswerValue::Many(vec![
            "Shopping Cart".to_string(),
            "Payment Processing".to_string(),
            "Inventory Management".to_string(),
            "Search".to_string(),
        ]),
    );
    commerce.insert(keys::TIMELINE, AnswerValue::Text("3-6 months".to_string()));
    records.push(commerce);

    let mut mobile = AssessmentAnswers::new();
    mobile.insert(keys::PROJECT_TYPE, AnswerValue::Text("mobile-app".to_string()));
    mobile.insert(
        keys::FEATURES,
        AnswerValue::Many(vec!["Real-Time Chat".to_string(), "Notifications".to_string()]),
    );
    mobile.insert(keys::TIMELINE, AnswerValue::Text("asap".to_string()));
    mobile.insert(keys::DESIGN_TIER, AnswerValue::Text("premium".to_string()));
    records.push(mobile);

    let mut sparse = AssessmentAnswers::new();
    sparse.insert(keys::PROJECT_TYPE, AnswerValue::Text("marketing-site".to_string()));
    records.push(sparse);

    records
        .into_iter()
        .map(|answers| {
            let mut assessment = ProjectAssessment::new(answers);
            assessment.replace_pricing(calculate_pricing(&assessment.answers));
            assessment
        })
        .collect()
}

pub async fn seed_demo_data(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let repository = SqlAssessmentRepository::new(pool.clone());
    let assessments = demo_assessments();
    let inserted = assessments.len();

    for assessment in &assessments {
        repository.save(assessment).await?;
    }

    Ok(SeedResult { inserted })
}

#[cfg(test)]
mod tests {
    use crate::{connect_with_settings, migrations};

    use super::{demo_assessments, seed_demo_data};

    #[test]
    fn every_fixture_carries_a_breakdown() {
        for assessment in demo_assessments() {
            let breakdown = assessment.pricing.expect("fixtures are pre-priced");
            assert!(breakdown.subtotal > rust_decimal::Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn seeding_inserts_every_fixture() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory database should connect");
        migrations::run_pending(&pool).await.expect("migrations apply");

        let result = seed_demo_data(&pool).await.expect("seed");
        assert_eq!(result.inserted, 3);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project_assessment")
            .fetch_one(&pool)
            .await
            .expect("count query");
        assert_eq!(count, 3);
    }
}
