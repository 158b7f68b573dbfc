use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::JwtService,
    errors::{AppError, AppResult},
    models::{
        domain::{refresh_token::hash_token, RefreshToken, User},
        dto::{
            request::{LoginRequest, RefreshTokenRequest},
            response::TokenPairResponse,
        },
    },
    repositories::RefreshTokenRepository,
    services::user_service::UserService,
};

/// Issues access/refresh token pairs and rotates refresh tokens.
pub struct AuthService {
    user_service: Arc<UserService>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        user_service: Arc<UserService>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_service,
            refresh_tokens,
            jwt_service,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenPairResponse> {
        request.validate()?;

        let user = self
            .user_service
            .authenticate(&request.username, &request.password)
            .await?;

        log::info!("User '{}' logged in as {}", user.username, user.role);
        self.issue_pair(&user).await
    }

    /// Exchanges a refresh token for a new pair. The presented token is
    /// consumed; presenting it again revokes every token of that user.
    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<TokenPairResponse> {
        request.validate()?;

        let claims = self.jwt_service.validate_refresh_token(&request.refresh)?;
        let token_hash = hash_token(&request.refresh);

        let stored = self
            .refresh_tokens
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Refresh token is not recognised".to_string()))?;

        if stored.revoked_at.is_some() {
            let revoked = self.refresh_tokens.revoke_all_for_user(&stored.user_id).await?;
            log::warn!(
                "Refresh token reuse for user {}; revoked {} outstanding tokens",
                stored.user_id,
                revoked
            );
            return Err(AppError::Unauthenticated(
                "Refresh token has already been used".to_string(),
            ));
        }

        if !stored.is_usable() || !self.refresh_tokens.revoke(&token_hash).await? {
            return Err(AppError::Unauthenticated(
                "Refresh token is no longer valid".to_string(),
            ));
        }

        let user = self
            .user_service
            .find_user(&claims.sub)
            .await
            .map_err(|_| {
                AppError::Unauthenticated("User associated with refresh token not found".to_string())
            })?;

        log::info!("Token refreshed successfully for user: {}", user.username);
        self.issue_pair(&user).await
    }

    pub async fn revoke(&self, request: RefreshTokenRequest) -> AppResult<()> {
        request.validate()?;

        self.jwt_service.validate_refresh_token(&request.refresh)?;
        if !self.refresh_tokens.revoke(&hash_token(&request.refresh)).await? {
            return Err(AppError::Unauthenticated(
                "Refresh token is no longer valid".to_string(),
            ));
        }
        Ok(())
    }

    /// Revokes every outstanding refresh token of a user.
    pub async fn revoke_user_tokens(&self, user_id: &str) -> AppResult<u64> {
        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        if revoked > 0 {
            log::info!("Revoked {} refresh tokens of user {}", revoked, user_id);
        }
        Ok(revoked)
    }

    async fn issue_pair(&self, user: &User) -> AppResult<TokenPairResponse> {
        let access = self.jwt_service.create_token(user)?;
        let (refresh, expires_at) = self.jwt_service.create_refresh_token(&user.id)?;

        self.refresh_tokens
            .create(RefreshToken::issue(&refresh, &user.id, expires_at))
            .await?;

        Ok(TokenPairResponse { access, refresh })
    }
}
