pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{demo_assessments, seed_demo_data, SeedResult};
pub use repositories::{
    AssessmentRepository, InMemoryAssessmentRepository, RepositoryError, SqlAssessmentRepository,
};
