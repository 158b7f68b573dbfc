use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use eit_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origins = config.cors_allowed_origins.clone();

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to initialise application: {}", e)))?;
    state
        .bootstrap_admin()
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to bootstrap admin: {}", e)))?;

    log::info!("Starting HTTP server on {}:{}", host, port);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers(vec!["x-request-id"])
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
