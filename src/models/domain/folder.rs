use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub access_code: String, // Generated on create, never changes
    pub owner_id: String,    // Admin who created the folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Folder {
    pub fn new(name: &str, access_code: &str, owner_id: &str) -> Self {
        Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            access_code: access_code.to_string(),
            owner_id: owner_id.to_string(),
            created_at: Some(Utc::now()),
        }
    }

    /// Exact, case-sensitive comparison against the stored code.
    pub fn code_matches(&self, code: &str) -> bool {
        self.access_code == code
    }
}
