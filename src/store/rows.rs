use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    codec::{decode_list, encode_list},
    StoreError,
};
use crate::models::{NewQuestion, NewRecipe, Question, Quiz, Recipe};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub options: String,
    pub correct_answer: i32,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub ingredients: String,
    pub steps: String,
    pub preparation_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizRow {
    /// Attaches `questions` (in any order) and decodes them.
    pub fn into_quiz(self, mut questions: Vec<QuestionRow>) -> Result<Quiz, StoreError> {
        questions.sort_by_key(|q| q.position);

        Ok(Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            questions: questions
                .into_iter()
                .map(Question::try_from)
                .collect::<Result<_, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl QuestionRow {
    pub fn new(
        quiz_id: Uuid,
        position: usize,
        question: &NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: Uuid::new_v4(),
            quiz_id,
            text: question.text.clone(),
            options: encode_list("options", &question.options)?,
            correct_answer: question.correct_answer,
            position: position_of(position),
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<QuestionRow> for Question {
    type Error = StoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            options: decode_list("options", &row.options)?,
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.text,
            correct_answer: row.correct_answer,
            order: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl RecipeRow {
    pub fn new(id: Uuid, recipe: &NewRecipe, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            ingredients: encode_list("ingredients", &recipe.ingredients)?,
            steps: encode_list("steps", &recipe.steps)?,
            preparation_time: recipe.preparation_time.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = StoreError;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Recipe {
            ingredients: decode_list("ingredients", &row.ingredients)?,
            steps: decode_list("steps", &row.steps)?,
            id: row.id,
            name: row.name,
            description: row.description,
            preparation_time: row.preparation_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Question positions are stored as `INTEGER`.
pub fn position_of(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
