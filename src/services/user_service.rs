use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        Claims,
    },
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::CreateUserRequest,
            response::{PaginatedResponse, UserDto},
        },
    },
    repositories::UserRepository,
    services::cascade::CascadeDeleter,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    cascade: Arc<CascadeDeleter>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, cascade: Arc<CascadeDeleter>) -> Self {
        Self {
            repository,
            cascade,
        }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserDto> {
        request.validate()?;

        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(format!(
                "User '{}' already exists",
                request.username
            )));
        }

        let password_hash = hash_password_blocking(request.password).await?;
        let user = User::new(&request.username, &password_hash, request.role);
        let user = self.repository.create(user).await?;

        log::info!("Created {} user '{}'", user.role, user.username);
        Ok(user.into())
    }

    pub async fn get_user(&self, id: &str) -> AppResult<UserDto> {
        self.find_user(id).await.map(UserDto::from)
    }

    pub async fn find_user(&self, id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> AppResult<PaginatedResponse<UserDto>> {
        let (users, total) = self.repository.list(offset, limit).await?;
        Ok(PaginatedResponse::new(users, offset, limit, total).map(UserDto::from))
    }

    /// Deletes a user after their sessions and owned folders. Admins cannot
    /// delete themselves and the last admin account always stays.
    pub async fn delete_user(&self, caller: &Claims, id: &str) -> AppResult<()> {
        if caller.sub == id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }

        let user = self.find_user(id).await?;
        if user.is_admin() && self.repository.count_by_role(UserRole::Admin).await? <= 1 {
            return Err(AppError::ValidationError(
                "The last admin account cannot be deleted".to_string(),
            ));
        }

        self.cascade.delete_user_contents(&user.id).await?;
        self.repository.delete(&user.id).await?;

        log::info!(
            "{} deleted {} user '{}'",
            caller.username,
            user.role,
            user.username
        );
        Ok(())
    }

    /// Unknown usernames and wrong passwords fail identically, and both run
    /// one argon2 verification.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let user = self.repository.find_by_username(username).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        let verified = verify_password_blocking(password.to_string(), stored_hash).await?;
        match user {
            Some(user) if verified => Ok(user),
            _ => Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string())),
        }
    }

    /// Seeds an admin account when the username is free. Returns whether a
    /// user was created; an existing account is left untouched.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        if let Some(existing) = self.repository.find_by_username(username).await? {
            if existing.role != UserRole::Admin {
                log::warn!(
                    "Bootstrap admin '{}' already exists with role '{}'",
                    username,
                    existing.role
                );
            }
            return Ok(false);
        }

        self.create_user(CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
        })
        .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::{hash_password, verify_password},
        repositories::{
            MockAnswerRepository, MockFolderRepository, MockSessionRepository,
            MockTestRepository, MockUserRepository,
        },
        test_utils::fixtures::{admin_claims, idle_cascade},
    };

    fn service(repository: MockUserRepository) -> UserService {
        UserService::new(Arc::new(repository), idle_cascade())
    }

    fn request(username: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: "correct horse".to_string(),
            role,
        }
    }

    #[actix_rt::test]
    async fn test_create_user_hashes_password() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(|_| Ok(None));
        repository.expect_create().times(1).returning(|user| {
            assert_ne!(user.password_hash, "correct horse");
            assert!(verify_password("correct horse", &user.password_hash));
            Ok(user)
        });

        let service = service(repository);
        let dto = service
            .create_user(request("teacher", UserRole::Admin))
            .await
            .unwrap();

        assert_eq!(dto.username, "teacher");
        assert_eq!(dto.role, UserRole::Admin);
    }

    #[actix_rt::test]
    async fn test_create_user_rejects_duplicate_username() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(|name| Ok(Some(User::test_student(name))));
        repository.expect_create().never();

        let service = service(repository);
        let result = service.create_user(request("pupil", UserRole::Student)).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[actix_rt::test]
    async fn test_create_user_validates_before_storage() {
        let repository = MockUserRepository::new();
        let service = service(repository);

        let result = service.create_user(request("a b", UserRole::Student)).await;

        assert!(matches!(result, Err(AppError::InvalidFields(_))));
    }

    #[actix_rt::test]
    async fn test_authenticate() {
        let hash = hash_password("correct horse").unwrap();
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_username().returning(move |name| {
            if name == "pupil" {
                Ok(Some(User::new(name, &hash, UserRole::Student)))
            } else {
                Ok(None)
            }
        });

        let service = service(repository);

        let user = service.authenticate("pupil", "correct horse").await.unwrap();
        assert_eq!(user.username, "pupil");

        let wrong_password = service.authenticate("pupil", "wrong").await.unwrap_err();
        let unknown_user = service.authenticate("ghost", "correct horse").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AppError::Unauthenticated(_)));
    }

    #[actix_rt::test]
    async fn test_ensure_admin_skips_existing_account() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(|name| Ok(Some(User::test_admin(name))));
        repository.expect_create().never();

        let service = service(repository);

        assert!(!service.ensure_admin("root", "long enough password").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_get_user_not_found() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let service = service(repository);

        assert!(matches!(
            service.get_user("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_authenticate_unknown_user_still_verifies() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);
        let result = service.authenticate("ghost", "").await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[actix_rt::test]
    async fn test_delete_user_cascades_then_removes_user() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| {
                let mut user = User::test_student("pupil");
                user.id = id.to_string();
                Ok(Some(user))
            });
        repository.expect_count_by_role().never();
        repository.expect_delete().times(1).returning(|id| {
            assert_eq!(id, "pupil-id");
            Ok(())
        });

        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_ids_by_student()
            .times(1)
            .returning(|_| Ok(vec!["s1".to_string()]));
        sessions.expect_delete_by_ids().times(1).returning(|_| Ok(1));
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_delete_by_sessions()
            .times(1)
            .returning(|_| Ok(4));
        let mut folders = MockFolderRepository::new();
        folders
            .expect_find_ids_by_owner()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let cascade = Arc::new(CascadeDeleter::new(
            Arc::new(folders),
            Arc::new(MockTestRepository::new()),
            Arc::new(sessions),
            Arc::new(answers),
        ));
        let service = UserService::new(Arc::new(repository), cascade);

        service
            .delete_user(&admin_claims("admin-1"), "pupil-id")
            .await
            .unwrap();
    }

    #[actix_rt::test]
    async fn test_delete_user_refuses_own_account() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().never();
        repository.expect_delete().never();

        let service = service(repository);

        assert!(matches!(
            service.delete_user(&admin_claims("admin-1"), "admin-1").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete_user_keeps_last_admin() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(User::test_admin("root"))));
        repository
            .expect_count_by_role()
            .times(1)
            .returning(|role| {
                assert_eq!(role, UserRole::Admin);
                Ok(1)
            });
        repository.expect_delete().never();

        let service = service(repository);

        assert!(matches!(
            service.delete_user(&admin_claims("admin-1"), "root-id").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository.expect_delete().never();

        let service = service(repository);

        assert!(matches!(
            service.delete_user(&admin_claims("admin-1"), "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
