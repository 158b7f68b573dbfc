pub mod access_code;
pub mod answer_service;
pub mod auth_service;
pub mod cascade;
pub mod folder_service;
pub mod session_service;
pub mod test_service;
pub mod user_service;
