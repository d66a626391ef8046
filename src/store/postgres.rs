use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{
    codec::encode_list,
    rows::{position_of, QuestionRow, QuizRow, RecipeRow},
    Store, StoreError,
};
use crate::models::{NewQuestion, NewQuiz, NewRecipe, Quiz, Recipe};

const QUIZ_COLUMNS: &str = "id, title, description, created_at, updated_at";
const QUESTION_COLUMNS: &str =
    "id, quiz_id, text, options, correct_answer, position, created_at, updated_at";
const RECIPE_COLUMNS: &str =
    "id, name, description, ingredients, steps, preparation_time, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn questions_of(&self, quiz_ids: &[Uuid]) -> Result<Vec<QuestionRow>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ANY($1) ORDER BY position"
        ))
        .bind(quiz_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

async fn insert_questions(
    conn: &mut PgConnection,
    quiz_id: Uuid,
    questions: &[NewQuestion],
) -> Result<Vec<QuestionRow>, StoreError> {
    let mut rows = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "INSERT INTO questions (id, quiz_id, text, options, correct_answer, position) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(&question.text)
        .bind(encode_list("options", &question.options)?)
        .bind(question.correct_answer)
        .bind(position_of(index))
        .fetch_one(&mut *conn)
        .await?;

        rows.push(row);
    }

    Ok(rows)
}

#[async_trait]
impl Store for PgStore {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "INSERT INTO quizzes (id, title, description) VALUES ($1, $2, $3) \
             RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&quiz.title)
        .bind(&quiz.description)
        .fetch_one(&mut *tx)
        .await?;

        let questions = insert_questions(&mut tx, row.id, &quiz.questions).await?;
        tx.commit().await?;

        debug!(quiz_id = %row.id, questions = questions.len(), "Created quiz");
        row.into_quiz(questions)
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        let quizzes = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = quizzes.iter().map(|q| q.id).collect();
        let mut by_quiz: HashMap<Uuid, Vec<QuestionRow>> = HashMap::new();
        for question in self.questions_of(&ids).await? {
            by_quiz.entry(question.quiz_id).or_default().push(question);
        }

        quizzes
            .into_iter()
            .map(|quiz| {
                let questions = by_quiz.remove(&quiz.id).unwrap_or_default();
                quiz.into_quiz(questions)
            })
            .collect()
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StoreError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Quiz"))?;

        let questions = self.questions_of(&[id]).await?;
        row.into_quiz(questions)
    }

    async fn update_quiz(&self, id: Uuid, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "UPDATE quizzes SET title = $2, description = $3, updated_at = now() \
             WHERE id = $1 RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Quiz"))?;

        let removed = sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let questions = insert_questions(&mut tx, id, &quiz.questions).await?;
        tx.commit().await?;

        debug!(quiz_id = %id, removed, inserted = questions.len(), "Replaced quiz questions");
        row.into_quiz(questions)
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Quiz"));
        }

        debug!(quiz_id = %id, "Deleted quiz");
        Ok(())
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "INSERT INTO recipes (id, name, description, ingredients, steps, preparation_time) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(encode_list("ingredients", &recipe.ingredients)?)
        .bind(encode_list("steps", &recipe.steps)?)
        .bind(&recipe.preparation_time)
        .fetch_one(&self.pool)
        .await?;

        debug!(recipe_id = %row.id, "Created recipe");
        Recipe::try_from(row)
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Recipe::try_from)
        .collect()
    }

    async fn get_recipe(&self, id: Uuid) -> Result<Recipe, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Recipe"))?;

        Recipe::try_from(row)
    }

    async fn update_recipe(&self, id: Uuid, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "UPDATE recipes SET name = $2, description = $3, ingredients = $4, steps = $5, \
             preparation_time = $6, updated_at = now() WHERE id = $1 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(encode_list("ingredients", &recipe.ingredients)?)
        .bind(encode_list("steps", &recipe.steps)?)
        .bind(&recipe.preparation_time)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Recipe"))?;

        debug!(recipe_id = %id, "Updated recipe");
        Recipe::try_from(row)
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Recipe"));
        }

        debug!(recipe_id = %id, "Deleted recipe");
        Ok(())
    }
}
