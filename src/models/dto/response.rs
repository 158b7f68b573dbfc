use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::domain::{
    AnswerRecord, Folder, SectionType, Session, Test, User, UserRole,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderDto {
    pub id: String,
    pub name: String,
    pub access_code: String,
    pub owner: Option<UserDto>,
}

impl FolderDto {
    pub fn new(folder: Folder, owner: Option<User>) -> Self {
        FolderDto {
            id: folder.id,
            name: folder.name,
            access_code: folder.access_code,
            owner: owner.map(UserDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestDto {
    pub id: String,
    pub folder: String,
    pub title: String,
    pub section_number: u32,
    pub section_type: SectionType,
    pub delta: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Test> for TestDto {
    fn from(test: Test) -> Self {
        TestDto {
            id: test.id,
            folder: test.folder_id,
            title: test.title,
            section_number: test.section_number,
            section_type: test.section_type,
            delta: test.delta,
            created_at: test.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub id: String,
    pub student: String,
    pub test: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        SessionDto {
            id: session.id,
            student: session.student_id,
            test: session.test_id,
            started_at: session.started_at,
            finished_at: session.finished_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerDto {
    pub id: String,
    pub session: String,
    pub question_index: u32,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

impl From<AnswerRecord> for AnswerDto {
    fn from(record: AnswerRecord) -> Self {
        AnswerDto {
            id: record.id,
            session: record.session_id,
            question_index: record.question_index,
            answer: record.answer,
            answered_at: record.answered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMetadata {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, offset: i64, limit: i64, total: i64) -> Self {
        PaginatedResponse {
            items,
            pagination: PaginationMetadata {
                offset,
                limit,
                total,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_dto_hides_password_hash() {
        let user = User::new("teacher", "$argon2id$secret", UserRole::Admin);
        let value = serde_json::to_value(UserDto::from(user)).unwrap();

        assert_eq!(value["username"], "teacher");
        assert_eq!(value["role"], "admin");
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_folder_dto_nests_owner() {
        let owner = User::new("teacher", "hash", UserRole::Admin);
        let folder = Folder::new("Mocks", "AB12CD", &owner.id);
        let value = serde_json::to_value(FolderDto::new(folder, Some(owner.clone()))).unwrap();

        assert_eq!(value["access_code"], "AB12CD");
        assert_eq!(value["owner"]["id"], json!(owner.id));
        assert_eq!(value["owner"]["role"], "admin");
    }

    #[test]
    fn test_session_dto_uses_relation_names() {
        let session = Session::start("student-1", "test-1");
        let value = serde_json::to_value(SessionDto::from(session)).unwrap();

        assert_eq!(value["student"], "student-1");
        assert_eq!(value["test"], "test-1");
        assert!(value["finished_at"].is_null());
    }

    #[test]
    fn test_paginated_response_map_keeps_metadata() {
        let page = PaginatedResponse::new(vec![1, 2], 10, 2, 12).map(|n| n * 10);

        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.pagination.offset, 10);
        assert_eq!(page.pagination.total, 12);
    }
}
