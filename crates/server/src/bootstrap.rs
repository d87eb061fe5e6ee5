use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use estimo_agent::llm::{OllamaTextGenerator, TextGenerator, UnavailableTextGenerator};
use estimo_core::config::{AppConfig, ConfigError, LlmProvider, LoadOptions};
use estimo_core::pricing::engine::DeterministicPricingEngine;
use estimo_core::pricing::registry::RuleTableError;
use estimo_db::{connect_with_settings, migrations, DbPool, SqlAssessmentRepository};

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub api_state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("pricing table validation failed: {0}")]
    RuleTable(#[from] RuleTableError),
    #[error("llm client initialization failed: {0}")]
    LlmClient(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        assessment_id = "unknown",
        "starting application bootstrap"
    );

    // Table defects are deployment errors; refuse to serve a single request
    // with a malformed registry or rule set.
    let engine = DeterministicPricingEngine::standard()?;
    info!(
        event_name = "system.bootstrap.pricing_tables_validated",
        correlation_id = "bootstrap",
        assessment_id = "unknown",
        feature_count = engine.registry().entries().len(),
        "pricing tables validated"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        assessment_id = "unknown",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        assessment_id = "unknown",
        "database migrations applied"
    );

    let generator = build_text_generator(&config)?;
    let repository = Arc::new(SqlAssessmentRepository::new(db_pool.clone()));
    let api_state = ApiState::new(repository, generator);

    Ok(Application { config, db_pool, api_state })
}

fn build_text_generator(config: &AppConfig) -> Result<Arc<dyn TextGenerator>, BootstrapError> {
    match config.llm.provider {
        LlmProvider::Ollama => {
            let base_url = config
                .llm
                .base_url
                .clone()
                .ok_or_else(|| BootstrapError::LlmClient("ollama base_url missing".to_string()))?;
            let generator =
                OllamaTextGenerator::new(base_url, config.llm.model.clone(), config.llm.timeout_secs)
                    .map_err(|error| BootstrapError::LlmClient(error.to_string()))?;
            Ok(Arc::new(generator))
        }
        provider @ (LlmProvider::OpenAi | LlmProvider::Anthropic) => {
            // Hosted providers are configured but not wired yet; suggestion
            // and proposal endpoints stay available through the fallback.
            warn!(
                event_name = "system.bootstrap.llm_provider_unwired",
                correlation_id = "bootstrap",
                assessment_id = "unknown",
                provider = ?provider,
                "provider has no client implementation, narration will use templated fallbacks"
            );
            Ok(Arc::new(UnavailableTextGenerator::new(format!(
                "provider {provider:?} has no client implementation"
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use estimo_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_prepares_schema_and_state() {
        let app = bootstrap(overrides("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed with in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name = 'project_assessment'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("schema query");
        assert_eq!(table_count, 1, "bootstrap should create the assessment table");
    }

    #[tokio::test]
    async fn bootstrap_rejects_non_sqlite_database_urls() {
        let result = bootstrap(overrides("postgres://nope")).await;
        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }
}
