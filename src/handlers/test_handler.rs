use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{PaginationParams, PatchTestRequest, TestFilter, TestRequest},
};

#[get("/tests")]
pub async fn list_tests(
    state: web::Data<AppState>,
    filter: web::Query<TestFilter>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;
    let response = state
        .test_service
        .list_tests(
            filter.into_inner().folder,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/tests")]
pub async fn create_test(
    state: web::Data<AppState>,
    request: web::Json<TestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state.test_service.create_test(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(test))
}

#[get("/tests/{id}")]
pub async fn get_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state.test_service.get_test(&id).await?;
    Ok(HttpResponse::Ok().json(test))
}

#[put("/tests/{id}")]
pub async fn replace_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<TestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state
        .test_service
        .replace_test(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(test))
}

#[patch("/tests/{id}")]
pub async fn patch_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<PatchTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let test = state
        .test_service
        .patch_test(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(test))
}

#[delete("/tests/{id}")]
pub async fn delete_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.test_service.delete_test(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
