use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::{Claims, RefreshClaims, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_TYPE},
    errors::{AppError, AppResult},
    models::domain::User,
};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
    refresh_expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64, refresh_expiration_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            expiration_hours,
            refresh_expiration_hours,
        }
    }

    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let claims = Claims::new(user, self.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AppError::Unauthenticated(
                "Token is not an access token".to_string(),
            ));
        }

        Ok(claims)
    }

    /// Returns the encoded token and its expiry so the caller can persist it.
    pub fn create_refresh_token(&self, user_id: &str) -> AppResult<(String, DateTime<Utc>)> {
        let claims = RefreshClaims::new(user_id, self.refresh_expiration_hours);

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::InternalError(format!("Failed to create refresh token: {}", e))
        })?;

        Ok((token, claims.expires_at()))
    }

    pub fn validate_refresh_token(&self, token: &str) -> AppResult<RefreshClaims> {
        let token_data = decode::<RefreshClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthenticated("Refresh token has expired".to_string())
                }
                ErrorKind::InvalidToken => {
                    AppError::Unauthenticated("Invalid refresh token format".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::Unauthenticated("Refresh token signature is invalid".to_string())
                }
                _ => AppError::Unauthenticated(format!("Refresh token validation failed: {}", e)),
            })?;

        if token_data.claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(AppError::Unauthenticated(
                "Token is not a refresh token".to_string(),
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, models::domain::UserRole};

    fn jwt_service() -> JwtService {
        let config = Config::test_config();
        JwtService::new(&config.jwt_secret, 1, 168)
    }

    #[test]
    fn test_admin_token_decodes_with_admin_role() {
        let jwt_service = jwt_service();
        let user = User::test_admin("teacher");

        let token = jwt_service.create_token(&user).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_student_token_decodes_with_student_role() {
        let jwt_service = jwt_service();
        let user = User::test_student("pupil");

        let token = jwt_service.create_token(&user).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.role, UserRole::Student);
        assert_eq!(claims.username, "pupil");
    }

    #[test]
    fn test_jwt_invalid_token() {
        let result = jwt_service().validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(&SecretString::from("another secret".to_string()), 1, 168);
        let token = other.create_token(&User::test_admin("teacher")).unwrap();

        assert!(jwt_service().validate_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_create_and_validate() {
        let jwt_service = jwt_service();

        let (refresh_token, expires_at) = jwt_service.create_refresh_token("user-1").unwrap();
        assert!(!refresh_token.is_empty());
        assert!(expires_at > Utc::now());

        let claims = jwt_service.validate_refresh_token(&refresh_token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.token_type, REFRESH_TOKEN_TYPE);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt_service = jwt_service();
        let (refresh_token, _) = jwt_service.create_refresh_token("user-1").unwrap();

        assert!(jwt_service.validate_token(&refresh_token).is_err());
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let jwt_service = jwt_service();
        let token = jwt_service.create_token(&User::test_student("pupil")).unwrap();

        match jwt_service.validate_refresh_token(&token) {
            Err(AppError::Unauthenticated(msg)) => {
                assert!(msg.contains("refresh token"));
            }
            other => panic!("Expected Unauthenticated error, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_refresh_token_invalid() {
        let result = jwt_service().validate_refresh_token("invalid.token.here");

        match result {
            Err(AppError::Unauthenticated(msg)) => {
                assert!(msg.contains("refresh token") || msg.contains("Refresh token"));
            }
            _ => panic!("Expected Unauthenticated error"),
        }
    }
}
