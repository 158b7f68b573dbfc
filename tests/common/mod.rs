#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;

use eit_server::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{AnswerRecord, Folder, RefreshToken, Session, Test, User, UserRole},
    repositories::{
        AnswerRepository, FolderRepository, RefreshTokenRepository, SessionRepository,
        TestRepository, UserRepository,
    },
    services::access_code::SeededAccessCodeGenerator,
};

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    let start = offset.max(0) as usize;
    if start >= items.len() {
        return vec![];
    }
    let end = (start + limit.max(0) as usize).min(items.len());
    items[start..end].to_vec()
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::AlreadyExists("duplicate username".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users.values().cloned().collect();
        items.sort_by(|a, b| a.username.cmp(&b.username));
        Ok((page(&items, offset, limit), items.len() as i64))
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.role == role).count() as i64)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFolderRepository {
    folders: RwLock<HashMap<String, Folder>>,
}

#[async_trait]
impl FolderRepository for InMemoryFolderRepository {
    async fn create(&self, folder: Folder) -> AppResult<Folder> {
        let mut folders = self.folders.write().await;
        if folders
            .values()
            .any(|f| f.access_code == folder.access_code)
        {
            return Err(AppError::AlreadyExists("duplicate access code".to_string()));
        }
        folders.insert(folder.id.clone(), folder.clone());
        Ok(folder)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Folder>> {
        Ok(self.folders.read().await.get(id).cloned())
    }

    async fn find_by_access_code(&self, access_code: &str) -> AppResult<Option<Folder>> {
        let folders = self.folders.read().await;
        Ok(folders
            .values()
            .find(|f| f.access_code == access_code)
            .cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Folder>, i64)> {
        let folders = self.folders.read().await;
        let mut items: Vec<_> = folders.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((page(&items, offset, limit), items.len() as i64))
    }

    async fn update(&self, folder: Folder) -> AppResult<Folder> {
        let mut folders = self.folders.write().await;
        match folders.get_mut(&folder.id) {
            Some(existing) => {
                *existing = folder.clone();
                Ok(folder)
            }
            None => Err(AppError::NotFound(format!("Folder with id '{}' not found", folder.id))),
        }
    }

    async fn find_ids_by_owner(&self, owner_id: &str) -> AppResult<Vec<String>> {
        let folders = self.folders.read().await;
        Ok(folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.id.clone())
            .collect())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.folders
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Folder with id '{}' not found", id)))
    }

    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        let mut folders = self.folders.write().await;
        Ok(ids.iter().filter(|id| folders.remove(*id).is_some()).count() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTestRepository {
    tests: RwLock<HashMap<String, Test>>,
}

#[async_trait]
impl TestRepository for InMemoryTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        self.tests.write().await.insert(test.id.clone(), test.clone());
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        Ok(self.tests.read().await.get(id).cloned())
    }

    async fn list(
        &self,
        folder_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Test>, i64)> {
        let tests = self.tests.read().await;
        let mut items: Vec<_> = tests
            .values()
            .filter(|t| folder_id.as_ref().map_or(true, |f| &t.folder_id == f))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            (a.section_type.to_string(), a.section_number, a.created_at)
                .cmp(&(b.section_type.to_string(), b.section_number, b.created_at))
        });
        Ok((page(&items, offset, limit), items.len() as i64))
    }

    async fn find_ids_by_folder(&self, folder_id: &str) -> AppResult<Vec<String>> {
        let tests = self.tests.read().await;
        Ok(tests
            .values()
            .filter(|t| t.folder_id == folder_id)
            .map(|t| t.id.clone())
            .collect())
    }

    async fn update(&self, test: Test) -> AppResult<Test> {
        let mut tests = self.tests.write().await;
        match tests.get_mut(&test.id) {
            Some(existing) => {
                *existing = test.clone();
                Ok(test)
            }
            None => Err(AppError::NotFound(format!("Test with id '{}' not found", test.id))),
        }
    }

    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        let mut tests = self.tests.write().await;
        Ok(ids.iter().filter(|id| tests.remove(*id).is_some()).count() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> AppResult<Session> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn list_by_student(
        &self,
        student_id: &str,
        test_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Session>, i64)> {
        let sessions = self.sessions.read().await;
        let mut items: Vec<_> = sessions
            .values()
            .filter(|s| s.student_id == student_id)
            .filter(|s| test_id.as_ref().map_or(true, |t| &s.test_id == t))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok((page(&items, offset, limit), items.len() as i64))
    }

    async fn find_ids_by_student(&self, student_id: &str) -> AppResult<Vec<String>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.student_id == student_id)
            .map(|s| s.id.clone())
            .collect())
    }

    async fn find_ids_by_tests(&self, test_ids: &[String]) -> AppResult<Vec<String>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| test_ids.contains(&s.test_id))
            .map(|s| s.id.clone())
            .collect())
    }

    async fn update(&self, session: Session) -> AppResult<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(session)
            }
            None => Err(AppError::NotFound(format!(
                "Session with id '{}' not found",
                session.id
            ))),
        }
    }

    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        let mut sessions = self.sessions.write().await;
        Ok(ids.iter().filter(|id| sessions.remove(*id).is_some()).count() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAnswerRepository {
    answers: RwLock<Vec<AnswerRecord>>,
}

impl InMemoryAnswerRepository {
    pub async fn count(&self) -> usize {
        self.answers.read().await.len()
    }
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn create(&self, record: AnswerRecord) -> AppResult<AnswerRecord> {
        self.answers.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_by_sessions(
        &self,
        session_ids: &[String],
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<AnswerRecord>, i64)> {
        let answers = self.answers.read().await;
        let mut items: Vec<_> = answers
            .iter()
            .filter(|a| session_ids.contains(&a.session_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            (&a.session_id, a.question_index, a.answered_at)
                .cmp(&(&b.session_id, b.question_index, b.answered_at))
        });
        Ok((page(&items, offset, limit), items.len() as i64))
    }

    async fn delete_by_sessions(&self, session_ids: &[String]) -> AppResult<u64> {
        let mut answers = self.answers.write().await;
        let before = answers.len();
        answers.retain(|a| !session_ids.contains(&a.session_id));
        Ok((before - answers.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(hash).cloned())
    }

    async fn revoke(&self, hash: &str) -> AppResult<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(hash) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.revoked_at.is_none())
        {
            token.revoked_at = Some(Utc::now());
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Handles on the in-memory stores so tests can inspect them directly.
pub struct TestStores {
    pub tests: Arc<InMemoryTestRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub answers: Arc<InMemoryAnswerRepository>,
}

pub const ADMIN_USERNAME: &str = "teacher";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

pub fn test_config() -> Config {
    Config {
        app_env: "test".to_string(),
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "eit-test".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        jwt_secret: SecretString::from("integration_test_secret".to_string()),
        jwt_expiration_hours: 1,
        refresh_expiration_hours: 24,
        cors_allowed_origins: Vec::new(),
        enforce_folder_ownership: false,
        bootstrap_admin_username: Some(ADMIN_USERNAME.to_string()),
        bootstrap_admin_password: Some(SecretString::from(ADMIN_PASSWORD.to_string())),
    }
}

/// Builds an application state over fresh in-memory stores with the
/// bootstrap admin already seeded.
pub async fn test_state(config: Config) -> (AppState, TestStores) {
    let tests = Arc::new(InMemoryTestRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());
    let answers = Arc::new(InMemoryAnswerRepository::default());

    let repositories = Repositories {
        users: Arc::new(InMemoryUserRepository::default()),
        folders: Arc::new(InMemoryFolderRepository::default()),
        tests: tests.clone(),
        sessions: sessions.clone(),
        answers: answers.clone(),
        refresh_tokens: Arc::new(InMemoryRefreshTokenRepository::default()),
    };

    let state = AppState::with_repositories(
        config,
        repositories,
        Arc::new(SeededAccessCodeGenerator::new(7)),
    );
    state
        .bootstrap_admin()
        .await
        .expect("bootstrap admin should be created");

    (
        state,
        TestStores {
            tests,
            sessions,
            answers,
        },
    )
}
