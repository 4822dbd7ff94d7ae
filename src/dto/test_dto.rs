use crate::models::question::{QuestionOption, QuestionType};
use crate::models::test::{Difficulty, TestType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestion {
    /// Kept when supplied so edits do not orphan recorded answers.
    pub question_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[validate(range(min = 0, message = "Marks cannot be negative"))]
    pub marks: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    pub test_type: TestType,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: i32,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "Passing score must be between 0 and 100"
    ))]
    pub passing_score: f64,
    #[validate(range(min = 0, message = "Total marks cannot be negative"))]
    pub total_marks: i32,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<CreateQuestion>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,
    pub test_type: Option<TestType>,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: Option<i32>,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "Passing score must be between 0 and 100"
    ))]
    pub passing_score: Option<f64>,
    #[validate(range(min = 0, message = "Total marks cannot be negative"))]
    pub total_marks: Option<i32>,
    #[validate(nested)]
    pub questions: Option<Vec<CreateQuestion>>,
    pub is_active: Option<bool>,
    pub is_published: Option<bool>,
}

// Trims strings and turns blank ones into None
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPerformanceQuery {
    pub test_type: Option<TestType>,
}
