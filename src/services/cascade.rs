use std::sync::Arc;

use crate::{
    errors::AppResult,
    repositories::{AnswerRepository, FolderRepository, SessionRepository, TestRepository},
};

/// Child-first deletion of dependent records: answers, then sessions, then
/// tests, then folders. Each step is its own storage call; there is no
/// enclosing transaction.
pub struct CascadeDeleter {
    folders: Arc<dyn FolderRepository>,
    tests: Arc<dyn TestRepository>,
    sessions: Arc<dyn SessionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl CascadeDeleter {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        tests: Arc<dyn TestRepository>,
        sessions: Arc<dyn SessionRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            folders,
            tests,
            sessions,
            answers,
        }
    }

    pub async fn delete_sessions(&self, session_ids: &[String]) -> AppResult<u64> {
        if session_ids.is_empty() {
            return Ok(0);
        }
        let answers = self.answers.delete_by_sessions(session_ids).await?;
        let sessions = self.sessions.delete_by_ids(session_ids).await?;
        log::info!("Deleted {} sessions and {} answers", sessions, answers);
        Ok(sessions)
    }

    pub async fn delete_tests(&self, test_ids: &[String]) -> AppResult<u64> {
        if test_ids.is_empty() {
            return Ok(0);
        }
        let session_ids = self.sessions.find_ids_by_tests(test_ids).await?;
        self.delete_sessions(&session_ids).await?;
        let tests = self.tests.delete_by_ids(test_ids).await?;
        log::info!("Deleted {} tests", tests);
        Ok(tests)
    }

    pub async fn delete_folder_contents(&self, folder_id: &str) -> AppResult<u64> {
        let test_ids = self.tests.find_ids_by_folder(folder_id).await?;
        self.delete_tests(&test_ids).await
    }

    /// Removes everything hanging off a user: their sessions with the
    /// answers, then the folders they own with their contents. The user
    /// record itself is left to the caller.
    pub async fn delete_user_contents(&self, user_id: &str) -> AppResult<()> {
        let session_ids = self.sessions.find_ids_by_student(user_id).await?;
        self.delete_sessions(&session_ids).await?;

        let folder_ids = self.folders.find_ids_by_owner(user_id).await?;
        if folder_ids.is_empty() {
            return Ok(());
        }
        for folder_id in &folder_ids {
            self.delete_folder_contents(folder_id).await?;
        }
        let folders = self.folders.delete_by_ids(&folder_ids).await?;
        log::info!("Deleted {} folders owned by user {}", folders, user_id);
        Ok(())
    }
}
