use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::Session,
        dto::{
            request::CreateSessionRequest,
            response::{PaginatedResponse, SessionDto},
        },
    },
    repositories::{SessionRepository, TestRepository},
    services::cascade::CascadeDeleter,
};

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    tests: Arc<dyn TestRepository>,
    cascade: Arc<CascadeDeleter>,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        tests: Arc<dyn TestRepository>,
        cascade: Arc<CascadeDeleter>,
    ) -> Self {
        Self {
            sessions,
            tests,
            cascade,
        }
    }

    /// The session always belongs to the caller.
    pub async fn start_session(
        &self,
        caller: &Claims,
        request: CreateSessionRequest,
    ) -> AppResult<SessionDto> {
        request.validate()?;

        if self.tests.find_by_id(&request.test).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Test with id '{}' not found",
                request.test
            )));
        }

        let session = self
            .sessions
            .create(Session::start(&caller.sub, &request.test))
            .await?;

        log::info!("{} started test {}", caller.username, session.test_id);
        Ok(session.into())
    }

    pub async fn get_session(&self, caller: &Claims, id: &str) -> AppResult<SessionDto> {
        self.find_owned(caller, id).await.map(SessionDto::from)
    }

    pub async fn list_sessions(
        &self,
        caller: &Claims,
        test_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<PaginatedResponse<SessionDto>> {
        let (sessions, total) = self
            .sessions
            .list_by_student(&caller.sub, test_id, offset, limit)
            .await?;
        Ok(PaginatedResponse::new(sessions, offset, limit, total).map(SessionDto::from))
    }

    pub async fn finish_session(&self, caller: &Claims, id: &str) -> AppResult<SessionDto> {
        let mut session = self.find_owned(caller, id).await?;
        if session.is_finished() {
            return Err(AppError::ValidationError(
                "Session is already finished".to_string(),
            ));
        }

        session.finished_at = Some(Utc::now());
        let session = self.sessions.update(session).await?;

        log::info!("{} finished test {}", caller.username, session.test_id);
        Ok(session.into())
    }

    pub async fn delete_session(&self, id: &str) -> AppResult<()> {
        let session = self
            .sessions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{}' not found", id)))?;

        self.cascade.delete_sessions(&[session.id]).await?;
        Ok(())
    }

    /// Another student's session is reported as missing.
    pub async fn find_owned(&self, caller: &Claims, id: &str) -> AppResult<Session> {
        self.sessions
            .find_by_id(id)
            .await?
            .filter(|session| session.is_owned_by(&caller.sub))
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{}' not found", id)))
    }
}
