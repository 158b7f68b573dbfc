use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{CreateUserRequest, PaginationParams},
};

#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state.user_service.create_user(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/users")]
pub async fn get_all_users(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;
    let response = state
        .user_service
        .list_users(pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/users/me")]
pub async fn get_current_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let user = state.user_service.get_user(&id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes the user together with their sessions and owned folders, then
/// revokes their refresh tokens.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.user_service.delete_user(&auth.0, &id).await?;
    state.auth_service.revoke_user_tokens(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let mongodb = match &state.db {
        Some(db) => match db.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                log::error!("Readiness check failed: {}", e);
                "error"
            }
        },
        None => "not_configured",
    };
    let ready = mongodb != "error";

    let response = serde_json::json!({
        "status": if ready { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": mongodb
        }
    });

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
pub async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
