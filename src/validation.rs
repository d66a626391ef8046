use thiserror::Error;

use crate::models::{NewQuestion, NewQuiz, NewRecipe, QuestionInput, QuizInput, RecipeInput};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid question format")]
    InvalidQuestion,

    #[error("correctAnswer is out of range")]
    AnswerOutOfRange,
}

fn required(value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ValidationError::MissingFields),
    }
}

fn non_empty<T>(value: Option<Vec<T>>) -> Result<Vec<T>, ValidationError> {
    match value {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(ValidationError::MissingFields),
    }
}

impl QuizInput {
    pub fn validate(self) -> Result<NewQuiz, ValidationError> {
        let title = required(self.title)?;
        let description = required(self.description)?;
        let questions = non_empty(self.questions)?
            .into_iter()
            .map(QuestionInput::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewQuiz {
            title,
            description,
            questions,
        })
    }
}

impl QuestionInput {
    pub fn validate(self) -> Result<NewQuestion, ValidationError> {
        let text = match self.text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::InvalidQuestion),
        };
        let options = match self.options {
            Some(o) if !o.is_empty() => o,
            _ => return Err(ValidationError::InvalidQuestion),
        };
        let correct_answer = self
            .correct_answer
            .ok_or(ValidationError::InvalidQuestion)?;

        if usize::try_from(correct_answer).map_or(true, |idx| idx >= options.len()) {
            return Err(ValidationError::AnswerOutOfRange);
        }

        Ok(NewQuestion {
            text,
            options,
            correct_answer,
        })
    }
}

impl RecipeInput {
    pub fn validate(self) -> Result<NewRecipe, ValidationError> {
        Ok(NewRecipe {
            name: required(self.name)?,
            description: required(self.description)?,
            ingredients: non_empty(self.ingredients)?,
            steps: non_empty(self.steps)?,
            preparation_time: required(self.preparation_time)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, options: &[&str], correct: i32) -> QuestionInput {
        QuestionInput {
            text: Some(text.to_string()),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            correct_answer: Some(correct),
        }
    }

    fn quiz(questions: Vec<QuestionInput>) -> QuizInput {
        QuizInput {
            title: Some("T".to_string()),
            description: Some("0123456789".to_string()),
            questions: Some(questions),
        }
    }

    fn recipe() -> RecipeInput {
        RecipeInput {
            name: Some("Soup".to_string()),
            description: Some("desc".to_string()),
            ingredients: Some(vec!["water".to_string()]),
            steps: Some(vec!["boil".to_string()]),
            preparation_time: Some("10 min".to_string()),
        }
    }

    #[test]
    fn accepts_well_formed_quiz() {
        let new = quiz(vec![question("Q1", &["A", "B"], 1)]).validate().unwrap();
        assert_eq!(new.title, "T");
        assert_eq!(new.questions.len(), 1);
        assert_eq!(new.questions[0].options, vec!["A", "B"]);
        assert_eq!(new.questions[0].correct_answer, 1);
    }

    #[test]
    fn rejects_blank_quiz_fields() {
        let mut input = quiz(vec![question("Q1", &["A"], 0)]);
        input.title = Some("   ".to_string());
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));

        let mut input = quiz(vec![question("Q1", &["A"], 0)]);
        input.description = None;
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));

        assert_eq!(quiz(vec![]).validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn rejects_malformed_questions() {
        let empty_options = quiz(vec![question("Q1", &[], 0)]);
        assert_eq!(empty_options.validate(), Err(ValidationError::InvalidQuestion));

        let no_text = quiz(vec![question("", &["A"], 0)]);
        assert_eq!(no_text.validate(), Err(ValidationError::InvalidQuestion));

        let mut no_answer = question("Q1", &["A"], 0);
        no_answer.correct_answer = None;
        assert_eq!(
            quiz(vec![no_answer]).validate(),
            Err(ValidationError::InvalidQuestion)
        );
    }

    #[test]
    fn correct_answer_must_index_an_option() {
        assert_eq!(
            quiz(vec![question("Q1", &["A", "B"], 2)]).validate(),
            Err(ValidationError::AnswerOutOfRange)
        );
        assert_eq!(
            quiz(vec![question("Q1", &["A", "B"], -1)]).validate(),
            Err(ValidationError::AnswerOutOfRange)
        );
    }

    #[test]
    fn recipe_requires_every_field() {
        assert!(recipe().validate().is_ok());

        let mut input = recipe();
        input.ingredients = Some(vec![]);
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));

        let mut input = recipe();
        input.steps = None;
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));

        let mut input = recipe();
        input.preparation_time = Some(String::new());
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));
    }
}
