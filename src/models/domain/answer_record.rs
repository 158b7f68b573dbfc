use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerRecord {
    pub id: String,
    pub session_id: String,
    pub question_index: u32,
    pub answer: String, // usually a serialized choice from the client
    pub answered_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn new(session_id: &str, question_index: u32, answer: &str) -> Self {
        AnswerRecord {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            question_index,
            answer: answer.to_string(),
            answered_at: Utc::now(),
        }
    }
}
