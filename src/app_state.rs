use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AnswerRepository, FolderRepository, MongoAnswerRepository, MongoFolderRepository,
        MongoRefreshTokenRepository, MongoSessionRepository, MongoTestRepository,
        MongoUserRepository, RefreshTokenRepository, SessionRepository, TestRepository,
        UserRepository,
    },
    services::{
        access_code::{AccessCodeGenerator, RandomAccessCodeGenerator},
        answer_service::AnswerService,
        auth_service::AuthService,
        cascade::CascadeDeleter,
        folder_service::FolderService,
        session_service::SessionService,
        test_service::TestService,
        user_service::UserService,
    },
};

/// One storage backend per entity. The server wires the Mongo
/// implementations; tests can substitute their own.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub folders: Arc<dyn FolderRepository>,
    pub tests: Arc<dyn TestRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            folders: Arc::new(MongoFolderRepository::new(db)),
            tests: Arc::new(MongoTestRepository::new(db)),
            sessions: Arc::new(MongoSessionRepository::new(db)),
            answers: Arc::new(MongoAnswerRepository::new(db)),
            refresh_tokens: Arc::new(MongoRefreshTokenRepository::new(db)),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.users.ensure_indexes().await?;
        self.folders.ensure_indexes().await?;
        self.tests.ensure_indexes().await?;
        self.sessions.ensure_indexes().await?;
        self.answers.ensure_indexes().await?;
        self.refresh_tokens.ensure_indexes().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt_service: Arc<JwtService>,
    /// `None` when running on non-Mongo repositories.
    pub db: Option<Database>,
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub folder_service: Arc<FolderService>,
    pub test_service: Arc<TestService>,
    pub session_service: Arc<SessionService>,
    pub answer_service: Arc<AnswerService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let repositories = Repositories::mongo(&db);
        repositories.ensure_indexes().await?;

        let purged = repositories.refresh_tokens.delete_expired().await?;
        if purged > 0 {
            log::info!("Purged {} expired refresh tokens", purged);
        }

        let mut state = Self::with_repositories(
            config,
            repositories,
            Arc::new(RandomAccessCodeGenerator),
        );
        state.db = Some(db);
        Ok(state)
    }

    pub fn with_repositories(
        config: Config,
        repositories: Repositories,
        codes: Arc<dyn AccessCodeGenerator>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.refresh_expiration_hours,
        ));

        let cascade = Arc::new(CascadeDeleter::new(
            repositories.folders.clone(),
            repositories.tests.clone(),
            repositories.sessions.clone(),
            repositories.answers.clone(),
        ));

        let user_service = Arc::new(UserService::new(
            repositories.users.clone(),
            cascade.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(
            user_service.clone(),
            repositories.refresh_tokens.clone(),
            jwt_service.clone(),
        ));
        let folder_service = Arc::new(FolderService::new(
            repositories.folders.clone(),
            repositories.users.clone(),
            cascade.clone(),
            codes,
            config.enforce_folder_ownership,
        ));
        let test_service = Arc::new(TestService::new(
            repositories.tests.clone(),
            repositories.folders.clone(),
            cascade.clone(),
        ));
        let session_service = Arc::new(SessionService::new(
            repositories.sessions.clone(),
            repositories.tests.clone(),
            cascade,
        ));
        let answer_service = Arc::new(AnswerService::new(
            repositories.answers.clone(),
            repositories.sessions.clone(),
        ));

        Self {
            config: Arc::new(config),
            jwt_service,
            db: None,
            user_service,
            auth_service,
            folder_service,
            test_service,
            session_service,
            answer_service,
        }
    }

    /// Creates the configured bootstrap admin if that username is free.
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_ref(),
        ) else {
            return Ok(());
        };

        if self
            .user_service
            .ensure_admin(username, password.expose_secret())
            .await?
        {
            log::info!("Bootstrap admin '{}' created", username);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        MockAnswerRepository, MockFolderRepository, MockRefreshTokenRepository,
        MockSessionRepository, MockTestRepository, MockUserRepository,
    };
    use secrecy::SecretString;

    fn repositories(users: MockUserRepository) -> Repositories {
        Repositories {
            users: Arc::new(users),
            folders: Arc::new(MockFolderRepository::new()),
            tests: Arc::new(MockTestRepository::new()),
            sessions: Arc::new(MockSessionRepository::new()),
            answers: Arc::new(MockAnswerRepository::new()),
            refresh_tokens: Arc::new(MockRefreshTokenRepository::new()),
        }
    }

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[actix_rt::test]
    async fn test_bootstrap_admin_skipped_without_credentials() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().never();

        let state = AppState::with_repositories(
            Config::test_config(),
            repositories(users),
            Arc::new(RandomAccessCodeGenerator),
        );

        assert!(state.bootstrap_admin().await.is_ok());
    }

    #[actix_rt::test]
    async fn test_bootstrap_admin_creates_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users.expect_create().times(1).returning(|user| {
            assert_eq!(user.username, "root");
            assert!(user.is_admin());
            Ok(user)
        });

        let mut config = Config::test_config();
        config.bootstrap_admin_username = Some("root".to_string());
        config.bootstrap_admin_password = Some(SecretString::from("s3cret-pass".to_string()));

        let state = AppState::with_repositories(
            config,
            repositories(users),
            Arc::new(RandomAccessCodeGenerator),
        );

        assert!(state.bootstrap_admin().await.is_ok());
    }
}
