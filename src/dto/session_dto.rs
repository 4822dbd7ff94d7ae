use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub candidate_id: Uuid,
    pub test_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: Uuid,
    pub answer: JsonValue,
    #[validate(range(min = 0, message = "Time taken cannot be negative"))]
    pub time_taken: Option<i32>,
}
