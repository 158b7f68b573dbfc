#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use crate::{
        auth::{claims::ACCESS_TOKEN_TYPE, Claims},
        models::domain::UserRole,
        repositories::{
            MockAnswerRepository, MockFolderRepository, MockSessionRepository, MockTestRepository,
        },
        services::cascade::CascadeDeleter,
    };

    /// Access-token claims for a caller with the given id and role.
    pub fn claims(sub: &str, role: UserRole) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: sub.to_string(),
            role,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            iat: 0,
            exp: 9999999999,
        }
    }

    pub fn admin_claims(sub: &str) -> Claims {
        claims(sub, UserRole::Admin)
    }

    pub fn student_claims(sub: &str) -> Claims {
        claims(sub, UserRole::Student)
    }

    /// A cascade whose repositories expect no calls at all.
    pub fn idle_cascade() -> Arc<CascadeDeleter> {
        Arc::new(CascadeDeleter::new(
            Arc::new(MockFolderRepository::new()),
            Arc::new(MockTestRepository::new()),
            Arc::new(MockSessionRepository::new()),
            Arc::new(MockAnswerRepository::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::auth::{is_admin, is_student};

    #[test]
    fn test_fixture_claims_carry_role() {
        assert!(is_admin(&admin_claims("a")));
        assert!(is_student(&student_claims("s")));
        assert_eq!(student_claims("s").sub, "s");
    }
}
