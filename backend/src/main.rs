mod classifier;
mod config;
mod recommend;
mod render;
mod routes;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{web, App, HttpServer};
use classifier::Classifier;
use config::AppConfig;
use recommend::RecommendationTable;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Configuration error: {}", e),
            ));
        }
    };

    let classifier = match Classifier::load(&config.model_path) {
        Ok(classifier) => classifier,
        Err(e) => {
            log::error!(
                "Failed to load model artifact '{}' at startup: {}",
                config.model_path, e
            );
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Model loading failed: {}", e),
            ));
        }
    };
    log::info!("Loaded model artifact from {}", config.model_path);

    let table = match RecommendationTable::load() {
        Ok(table) => table,
        Err(e) => {
            log::error!("Failed to load recommendation table: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Recommendation table loading failed: {}", e),
            ));
        }
    };
    table.verify_coverage();

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    let max_upload_bytes = config.max_upload_bytes;
    let classifier = web::Data::new(classifier);
    let table = web::Data::new(table);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes)
                    .memory_limit(max_upload_bytes),
            )
            .app_data(classifier.clone())
            .app_data(table.clone())
            .app_data(config.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
