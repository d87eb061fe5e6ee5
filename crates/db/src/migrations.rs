use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "project_assessment",
        "idx_project_assessment_status",
        "idx_project_assessment_created_at",
    ];

    #[tokio::test]
    async fn migrations_create_the_managed_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory database should connect");
        run_pending(&pool).await.expect("migrations should apply cleanly");

        for object in MANAGED_SCHEMA_OBJECTS {
            let row = sqlx::query("SELECT name FROM sqlite_master WHERE name = ?1")
                .bind(object)
                .fetch_optional(&pool)
                .await
                .expect("sqlite_master query");
            let found = row.map(|row| row.get::<String, _>("name"));
            assert_eq!(found.as_deref(), Some(*object), "missing schema object `{object}`");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory database should connect");

        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run should be a no-op");
    }
}
