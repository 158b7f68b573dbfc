use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Writing,
    Reading,
    Listening,
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SectionType::Writing => "writing",
            SectionType::Reading => "reading",
            SectionType::Listening => "listening",
        };
        f.write_str(label)
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "writing" => Ok(SectionType::Writing),
            "reading" => Ok(SectionType::Reading),
            "listening" => Ok(SectionType::Listening),
            other => Err(format!(
                "Unknown section type '{}', expected writing, reading or listening",
                other
            )),
        }
    }
}

/// A test definition. `delta` is the editor payload describing the
/// questions and is stored as-is.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Test {
    pub id: String,
    pub folder_id: String,
    pub title: String,
    pub section_number: u32,
    pub section_type: SectionType,
    pub delta: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Test {
    pub fn new(
        folder_id: &str,
        title: &str,
        section_number: u32,
        section_type: SectionType,
        delta: Value,
    ) -> Self {
        Test {
            id: Uuid::new_v4().to_string(),
            folder_id: folder_id.to_string(),
            title: title.to_string(),
            section_number,
            section_type,
            delta,
            created_at: Some(Utc::now()),
        }
    }
}
