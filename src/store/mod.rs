//! Persistence of quizzes and recipes.
//!
//! [`Store`] is implemented by [`PgStore`] for PostgreSQL and by
//! [`MemoryStore`], an in-process engine with the same row layout used when
//! no database is configured.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewQuiz, NewRecipe, Quiz, Recipe};

pub mod codec;
pub mod memory;
pub mod postgres;
pub mod rows;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("stored {field} could not be decoded")]
    Corrupt {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {field}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Create, list, get, update and delete for both resources.
///
/// Lists come back in creation order. Every sequence field is decoded before
/// it is returned. Updating a quiz replaces all of its questions, so question
/// ids do not survive an update.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError>;
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError>;
    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StoreError>;
    async fn update_quiz(&self, id: Uuid, quiz: NewQuiz) -> Result<Quiz, StoreError>;
    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError>;
    async fn get_recipe(&self, id: Uuid) -> Result<Recipe, StoreError>;
    async fn update_recipe(&self, id: Uuid, recipe: NewRecipe) -> Result<Recipe, StoreError>;
    async fn delete_recipe(&self, id: Uuid) -> Result<(), StoreError>;
}
