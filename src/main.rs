mod config;
mod error;
mod handlers;
mod models;
mod services;
mod state;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, /chat requests will fail");
    }
    if config.serp_api_key.is_none() {
        warn!("SERP_API_KEY is not set, material search will use fallback data");
    }

    let app_state = web::Data::new(AppState::new(&config));
    info!(host = %config.host, port = config.port, model = %config.gemini_model, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .route("/", web::get().to(handlers::main))
            .route("/health", web::get().to(handlers::health_check))
            .route("/chat", web::post().to(handlers::chat::send_message))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
