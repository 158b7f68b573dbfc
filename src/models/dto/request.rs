use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::models::domain::{SectionType, UserRole};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.@+-]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username may only contain letters, digits and @.+-_"
    ))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

/// Owner and access code are never taken from the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FolderRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinFolderRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderTestsQuery {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestRequest {
    #[validate(length(min = 1))]
    pub folder: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub section_number: u32,

    /// Checked by the validator so an unknown value is reported per field.
    #[validate(custom(function = "validate_section_type"))]
    pub section_type: String,

    #[validate(custom(function = "validate_delta"))]
    pub delta: Value,
}

impl TestRequest {
    pub fn section_type(&self) -> Result<SectionType, String> {
        self.section_type.parse()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PatchTestRequest {
    #[validate(length(min = 1))]
    pub folder: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    pub section_number: Option<u32>,

    #[validate(custom(function = "validate_section_type"))]
    pub section_type: Option<String>,

    /// An explicit `null` is kept as `Some(Value::Null)` and rejected.
    #[serde(default, deserialize_with = "present_value")]
    #[validate(custom(function = "validate_delta"))]
    pub delta: Option<Value>,
}

impl PatchTestRequest {
    pub fn section_type(&self) -> Result<Option<SectionType>, String> {
        self.section_type
            .as_deref()
            .map(str::parse::<SectionType>)
            .transpose()
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn validate_section_type(value: &str) -> Result<(), ValidationError> {
    value.parse::<SectionType>().map(|_| ()).map_err(|message| {
        ValidationError::new("section_type").with_message(message.into())
    })
}

fn validate_delta(value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        return Err(ValidationError::new("delta").with_message("This field may not be null".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestFilter {
    pub folder: Option<String>,
}

/// A `student` field sent by the client is ignored; the caller is the student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    pub test: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionFilter {
    pub test: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1))]
    pub session: String,

    pub question_index: u32,

    #[validate(length(min = 1, max = 10000))]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerFilter {
    pub session: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
