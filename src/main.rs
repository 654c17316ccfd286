use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;

use gallery_backend::config::Config;
use gallery_backend::db::{self, PgArtworkRepository, PgUserRepository};
use gallery_backend::errors::AppError;
use gallery_backend::state::{AppState, StateSettings};
use gallery_backend::storage::{create_s3_client, S3ObjectStorage};

fn startup_error(err: AppError) -> std::io::Error {
    error!("{}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(startup_error)?;

    // Initialize the database pool
    let pool = db::create_pool(&config.database_url).await.map_err(startup_error)?;

    let s3_client = create_s3_client(config.aws_region.clone()).await;
    let storage = S3ObjectStorage::new(
        s3_client,
        config.s3_bucket.clone(),
        config.public_storage_url.as_deref(),
    )
    .map_err(startup_error)?;

    let state = AppState::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgArtworkRepository::new(pool)),
        Arc::new(storage),
        StateSettings {
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
            max_upload_bytes: config.max_upload_bytes,
            confirmation_url: config.confirmation_url.clone(),
        },
    );

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(gallery_backend::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
