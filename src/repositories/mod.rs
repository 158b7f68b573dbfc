pub mod answer_repository;
pub mod folder_repository;
pub mod refresh_token_repository;
pub mod session_repository;
pub mod test_repository;
pub mod user_repository;

pub use answer_repository::{AnswerRepository, MongoAnswerRepository};
pub use folder_repository::{FolderRepository, MongoFolderRepository};
pub use refresh_token_repository::{MongoRefreshTokenRepository, RefreshTokenRepository};
pub use session_repository::{MongoSessionRepository, SessionRepository};
pub use test_repository::{MongoTestRepository, TestRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
#[cfg(test)]
pub use folder_repository::MockFolderRepository;
#[cfg(test)]
pub use refresh_token_repository::MockRefreshTokenRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use test_repository::MockTestRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
