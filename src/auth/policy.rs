use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::UserRole,
};

pub fn is_admin(claims: &Claims) -> bool {
    claims.role == UserRole::Admin
}

pub fn is_student(claims: &Claims) -> bool {
    claims.role == UserRole::Student
}

pub fn require_admin(claims: &Claims) -> AppResult<()> {
    if !is_admin(claims) {
        return Err(AppError::Forbidden(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_student(claims: &Claims) -> AppResult<()> {
    if !is_student(claims) {
        return Err(AppError::Forbidden(
            "Only students can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner(claims: &Claims, owner_id: &str) -> AppResult<()> {
    if claims.sub != owner_id {
        return Err(AppError::Forbidden(
            "You can only modify resources you own".to_string(),
        ));
    }
    Ok(())
}
