use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RefreshTokenRequest},
        response::MessageResponse,
    },
};

#[post("/api/token")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let pair = state.auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

#[post("/api/token/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let pair = state.auth_service.refresh(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

#[post("/api/token/revoke")]
pub async fn revoke_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    state.auth_service.revoke(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Refresh token revoked")))
}
