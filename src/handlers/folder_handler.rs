use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, require_student, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{FolderRequest, FolderTestsQuery, JoinFolderRequest, PaginationParams},
};

#[get("/folders")]
pub async fn list_folders(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;
    let response = state
        .folder_service
        .list_folders(pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/folders")]
pub async fn create_folder(
    state: web::Data<AppState>,
    request: web::Json<FolderRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let folder = state
        .folder_service
        .create_folder(&auth.0, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(folder))
}

#[get("/folders/{id}")]
pub async fn get_folder(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let folder = state.folder_service.get_folder(&id).await?;
    Ok(HttpResponse::Ok().json(folder))
}

#[put("/folders/{id}")]
pub async fn update_folder(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<FolderRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let folder = state
        .folder_service
        .update_folder(&auth.0, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(folder))
}

#[delete("/folders/{id}")]
pub async fn delete_folder(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.folder_service.delete_folder(&auth.0, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/folders/{id}/join")]
pub async fn join_folder(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<JoinFolderRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let folder = state
        .folder_service
        .join_folder(&id, &request.code)
        .await?;
    Ok(HttpResponse::Ok().json(folder))
}

#[get("/folders/{id}/tests")]
pub async fn list_folder_tests(
    state: web::Data<AppState>,
    id: web::Path<String>,
    filter: web::Query<FolderTestsQuery>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state
        .test_service
        .list_folder_tests(
            &auth.0,
            &id,
            filter.code.as_deref(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
