use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, require_student, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{CreateSessionRequest, PaginationParams, SessionFilter},
};

#[get("/sessions")]
pub async fn list_sessions(
    state: web::Data<AppState>,
    filter: web::Query<SessionFilter>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;
    let response = state
        .session_service
        .list_sessions(
            &auth.0,
            filter.into_inner().test,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/sessions")]
pub async fn start_session(
    state: web::Data<AppState>,
    request: web::Json<CreateSessionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let session = state
        .session_service
        .start_session(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(session))
}

#[get("/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let session = state.session_service.get_session(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/sessions/{id}/finish")]
pub async fn finish_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let session = state.session_service.finish_session(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[delete("/sessions/{id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.session_service.delete_session(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
