use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_student, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{AnswerFilter, CreateAnswerRequest, PaginationParams},
};

#[get("/answers")]
pub async fn list_answers(
    state: web::Data<AppState>,
    filter: web::Query<AnswerFilter>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;
    let response = state
        .answer_service
        .list_answers(
            &auth.0,
            filter.into_inner().session,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/answers")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<CreateAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let answer = state
        .answer_service
        .submit_answer(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(answer))
}
