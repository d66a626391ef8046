use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    rows::{QuestionRow, QuizRow, RecipeRow},
    Store, StoreError,
};
use crate::models::{NewQuestion, NewQuiz, NewRecipe, Quiz, Recipe};

/// In-process store keeping the same rows the database would, including the
/// encoded sequence columns. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    quizzes: Vec<QuizRow>,
    questions: Vec<QuestionRow>,
    recipes: Vec<RecipeRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn questions_of(&self, quiz_id: Uuid) -> Vec<QuestionRow> {
        self.questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect()
    }

    fn quiz(&self, id: Uuid) -> Result<Quiz, StoreError> {
        let row = self
            .quizzes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("Quiz"))?;

        row.into_quiz(self.questions_of(id))
    }
}

fn question_rows(quiz_id: Uuid, questions: &[NewQuestion]) -> Result<Vec<QuestionRow>, StoreError> {
    let now = Utc::now();
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionRow::new(quiz_id, index, question, now))
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        let now = Utc::now();
        let row = QuizRow {
            id: Uuid::new_v4(),
            title: quiz.title,
            description: quiz.description,
            created_at: now,
            updated_at: now,
        };
        let questions = question_rows(row.id, &quiz.questions)?;

        let mut tables = self.tables.write();
        tables.quizzes.push(row.clone());
        tables.questions.extend(questions.iter().cloned());

        debug!(quiz_id = %row.id, questions = questions.len(), "Created quiz");
        row.into_quiz(questions)
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        let tables = self.tables.read();
        tables
            .quizzes
            .iter()
            .map(|row| row.clone().into_quiz(tables.questions_of(row.id)))
            .collect()
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Quiz, StoreError> {
        self.tables.read().quiz(id)
    }

    async fn update_quiz(&self, id: Uuid, quiz: NewQuiz) -> Result<Quiz, StoreError> {
        // Encode before taking the lock so a failure leaves the tables untouched.
        let questions = question_rows(id, &quiz.questions)?;

        let mut tables = self.tables.write();
        let row = tables
            .quizzes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(StoreError::NotFound("Quiz"))?;
        row.title = quiz.title;
        row.description = quiz.description;
        row.updated_at = Utc::now();

        tables.questions.retain(|q| q.quiz_id != id);
        tables.questions.extend(questions);

        debug!(quiz_id = %id, "Replaced quiz questions");
        tables.quiz(id)
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let before = tables.quizzes.len();
        tables.quizzes.retain(|q| q.id != id);
        if tables.quizzes.len() == before {
            return Err(StoreError::NotFound("Quiz"));
        }
        tables.questions.retain(|q| q.quiz_id != id);

        debug!(quiz_id = %id, "Deleted quiz");
        Ok(())
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let row = RecipeRow::new(Uuid::new_v4(), &recipe, Utc::now())?;
        self.tables.write().recipes.push(row.clone());

        debug!(recipe_id = %row.id, "Created recipe");
        Recipe::try_from(row)
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        self.tables
            .read()
            .recipes
            .iter()
            .cloned()
            .map(Recipe::try_from)
            .collect()
    }

    async fn get_recipe(&self, id: Uuid) -> Result<Recipe, StoreError> {
        let row = self
            .tables
            .read()
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("Recipe"))?;

        Recipe::try_from(row)
    }

    async fn update_recipe(&self, id: Uuid, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write();
        let row = tables
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound("Recipe"))?;

        let updated = RecipeRow {
            created_at: row.created_at,
            ..RecipeRow::new(id, &recipe, Utc::now())?
        };
        *row = updated.clone();

        debug!(recipe_id = %id, "Updated recipe");
        Recipe::try_from(updated)
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != id);
        if tables.recipes.len() == before {
            return Err(StoreError::NotFound("Recipe"));
        }

        debug!(recipe_id = %id, "Deleted recipe");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionInput, QuizInput, RecipeInput};

    fn new_quiz(title: &str, questions: &[(&str, &[&str], i32)]) -> NewQuiz {
        QuizInput {
            title: Some(title.to_string()),
            description: Some("a quiz about coffee".to_string()),
            questions: Some(
                questions
                    .iter()
                    .map(|(text, options, correct)| QuestionInput {
                        text: Some(text.to_string()),
                        options: Some(options.iter().map(|o| o.to_string()).collect()),
                        correct_answer: Some(*correct),
                    })
                    .collect(),
            ),
        }
        .validate()
        .unwrap()
    }

    fn new_recipe(name: &str) -> NewRecipe {
        RecipeInput {
            name: Some(name.to_string()),
            description: Some("desc".to_string()),
            ingredients: Some(vec!["water".to_string(), "salt".to_string()]),
            steps: Some(vec!["boil".to_string(), "season".to_string()]),
            preparation_time: Some("10 min".to_string()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn quiz_round_trips_through_get() {
        let store = MemoryStore::new();
        let created = store
            .create_quiz(new_quiz("Beans", &[("Q1", &["A", "B"], 1), ("Q2", &["C"], 0)]))
            .await
            .unwrap();

        let fetched = store.get_quiz(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.questions[0].options, vec!["A", "B"]);
        assert_eq!(fetched.questions[0].order, 0);
        assert_eq!(fetched.questions[1].text, "Q2");
        assert_eq!(fetched.questions[1].order, 1);
        assert!(fetched.questions.iter().all(|q| q.quiz_id == created.id));
    }

    #[tokio::test]
    async fn lists_in_creation_order() {
        let store = MemoryStore::new();
        for title in ["first", "second", "third"] {
            store.create_quiz(new_quiz(title, &[("Q", &["A"], 0)])).await.unwrap();
        }

        let titles: Vec<_> = store
            .list_quizzes()
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn update_replaces_questions() {
        let store = MemoryStore::new();
        let created = store
            .create_quiz(new_quiz("Old", &[("Q1", &["A"], 0), ("Q2", &["B"], 0)]))
            .await
            .unwrap();

        let updated = store
            .update_quiz(created.id, new_quiz("New", &[("Only", &["X", "Y"], 1)]))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.questions.len(), 1);
        assert_eq!(updated.questions[0].text, "Only");
        assert!(created.questions.iter().all(|q| q.id != updated.questions[0].id));
        assert_eq!(store.tables.read().questions.len(), 1);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(store.get_quiz(id).await, Err(StoreError::NotFound("Quiz"))));
        assert!(matches!(
            store.update_quiz(id, new_quiz("T", &[("Q", &["A"], 0)])).await,
            Err(StoreError::NotFound("Quiz"))
        ));
        assert!(matches!(store.delete_quiz(id).await, Err(StoreError::NotFound("Quiz"))));
        assert!(matches!(store.get_recipe(id).await, Err(StoreError::NotFound("Recipe"))));
        assert!(matches!(
            store.update_recipe(id, new_recipe("Soup")).await,
            Err(StoreError::NotFound("Recipe"))
        ));
        assert!(matches!(store.delete_recipe(id).await, Err(StoreError::NotFound("Recipe"))));
    }

    #[tokio::test]
    async fn deleting_a_quiz_removes_its_questions() {
        let store = MemoryStore::new();
        let doomed = store
            .create_quiz(new_quiz("Doomed", &[("Q1", &["A"], 0), ("Q2", &["B"], 0)]))
            .await
            .unwrap();
        let kept = store.create_quiz(new_quiz("Kept", &[("Q", &["A"], 0)])).await.unwrap();

        store.delete_quiz(doomed.id).await.unwrap();

        assert!(matches!(store.get_quiz(doomed.id).await, Err(StoreError::NotFound(_))));
        let tables = store.tables.read();
        assert!(tables.questions.iter().all(|q| q.quiz_id == kept.id));
        assert_eq!(tables.questions.len(), 1);
    }

    #[tokio::test]
    async fn recipe_sequences_keep_their_order() {
        let store = MemoryStore::new();
        let created = store.create_recipe(new_recipe("Soup")).await.unwrap();
        let fetched = store.get_recipe(created.id).await.unwrap();

        assert_eq!(fetched.ingredients, vec!["water", "salt"]);
        assert_eq!(fetched.steps, vec!["boil", "season"]);
        assert_eq!(
            store.tables.read().recipes[0].ingredients,
            r#"["water","salt"]"#
        );
    }

    #[tokio::test]
    async fn corrupt_rows_surface_as_errors() {
        let store = MemoryStore::new();
        let recipe = store.create_recipe(new_recipe("Soup")).await.unwrap();
        let quiz = store.create_quiz(new_quiz("T", &[("Q", &["A"], 0)])).await.unwrap();

        store.tables.write().recipes[0].steps = "boil, then serve".to_string();
        store.tables.write().questions[0].options = "[1, 2".to_string();

        assert!(matches!(
            store.get_recipe(recipe.id).await,
            Err(StoreError::Corrupt { field: "steps", .. })
        ));
        assert!(matches!(
            store.list_quizzes().await,
            Err(StoreError::Corrupt { field: "options", .. })
        ));
        assert!(matches!(
            store.get_quiz(quiz.id).await,
            Err(StoreError::Corrupt { field: "options", .. })
        ));
    }
}
