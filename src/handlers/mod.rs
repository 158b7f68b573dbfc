pub mod answer_handler;
pub mod auth_handler;
pub mod folder_handler;
pub mod session_handler;
pub mod test_handler;
pub mod user_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

pub use user_handler::{health_check, health_check_live, health_check_ready};

/// Registers every route. Token endpoints and health checks are public;
/// everything else under `/api` sits behind [`AuthMiddleware`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(auth_handler::login)
        .service(auth_handler::refresh_token)
        .service(auth_handler::revoke_token)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(user_handler::get_current_user)
                .service(user_handler::get_all_users)
                .service(user_handler::get_user)
                .service(user_handler::create_user)
                .service(user_handler::delete_user)
                .service(folder_handler::list_folders)
                .service(folder_handler::create_folder)
                .service(folder_handler::get_folder)
                .service(folder_handler::update_folder)
                .service(folder_handler::delete_folder)
                .service(folder_handler::join_folder)
                .service(folder_handler::list_folder_tests)
                .service(test_handler::list_tests)
                .service(test_handler::create_test)
                .service(test_handler::get_test)
                .service(test_handler::replace_test)
                .service(test_handler::patch_test)
                .service(test_handler::delete_test)
                .service(session_handler::list_sessions)
                .service(session_handler::start_session)
                .service(session_handler::get_session)
                .service(session_handler::finish_session)
                .service(session_handler::delete_session)
                .service(answer_handler::list_answers)
                .service(answer_handler::submit_answer),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
