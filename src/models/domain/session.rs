use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    pub id: String,
    pub student_id: String,
    pub test_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn start(student_id: &str, test_id: &str) -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            test_id: test_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn is_owned_by(&self, student_id: &str) -> bool {
        self.student_id == student_id
    }
}
