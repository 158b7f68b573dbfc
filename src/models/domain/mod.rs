pub mod answer_record;
pub mod folder;
pub mod refresh_token;
pub mod session;
pub mod test_definition;
pub mod user;
pub use answer_record::AnswerRecord;
pub use folder::Folder;
pub use refresh_token::RefreshToken;
pub use session::Session;
pub use test_definition::{SectionType, Test};
pub use user::{User, UserRole};
