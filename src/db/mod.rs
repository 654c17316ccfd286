mod artworks;
mod users;

pub use artworks::PgArtworkRepository;
pub use users::PgUserRepository;

use sqlx::PgPool;
use log::info;

use crate::errors::AppError;

pub async fn create_pool(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPool::connect(database_url)
        .await
        .map_err(|err| AppError::DatabaseError(format!("Failed to connect to the database: {}", err)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| AppError::DatabaseError(format!("Failed to run migrations: {}", err)))?;
    info!("Database migrations applied");

    Ok(pool)
}
