use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub marks: i32,
}

impl Question {
    /// First option flagged correct. Later flagged options are ignored.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Question kind. Only `mcq` is auto-scored; any other label is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Mcq,
    Other(String),
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        if value == "mcq" {
            QuestionType::Mcq
        } else {
            QuestionType::Other(value)
        }
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        match value {
            QuestionType::Mcq => "mcq".to_string(),
            QuestionType::Other(label) => label,
        }
    }
}
