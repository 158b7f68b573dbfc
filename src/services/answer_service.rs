use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::AnswerRecord,
        dto::{
            request::CreateAnswerRequest,
            response::{AnswerDto, PaginatedResponse},
        },
    },
    repositories::{AnswerRepository, SessionRepository},
};

pub struct AnswerService {
    answers: Arc<dyn AnswerRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AnswerService {
    pub fn new(answers: Arc<dyn AnswerRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { answers, sessions }
    }

    /// Appends an answer to one of the caller's open sessions.
    pub async fn submit_answer(
        &self,
        caller: &Claims,
        request: CreateAnswerRequest,
    ) -> AppResult<AnswerDto> {
        request.validate()?;

        let session = self
            .sessions
            .find_by_id(&request.session)
            .await?
            .filter(|session| session.is_owned_by(&caller.sub))
            .ok_or_else(|| {
                AppError::NotFound(format!("Session with id '{}' not found", request.session))
            })?;

        if session.is_finished() {
            return Err(AppError::ValidationError(
                "Session is already finished".to_string(),
            ));
        }

        let record = AnswerRecord::new(&session.id, request.question_index, &request.answer);
        let record = self.answers.create(record).await?;
        Ok(record.into())
    }

    pub async fn list_answers(
        &self,
        caller: &Claims,
        session_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<PaginatedResponse<AnswerDto>> {
        let session_ids = match session_id {
            Some(id) => {
                let owned = self
                    .sessions
                    .find_by_id(&id)
                    .await?
                    .is_some_and(|session| session.is_owned_by(&caller.sub));
                if !owned {
                    return Err(AppError::NotFound(format!(
                        "Session with id '{}' not found",
                        id
                    )));
                }
                vec![id]
            }
            None => self.sessions.find_ids_by_student(&caller.sub).await?,
        };

        let (records, total) = self
            .answers
            .list_by_sessions(&session_ids, offset, limit)
            .await?;
        Ok(PaginatedResponse::new(records, offset, limit, total).map(AnswerDto::from))
    }
}
