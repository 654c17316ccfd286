use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::ArtworkRepository;
use crate::errors::AppError;
use crate::models::artwork::{Artwork, NewArtwork};

#[derive(Clone)]
pub struct PgArtworkRepository {
    pool: PgPool,
}

impl PgArtworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtworkRepository for PgArtworkRepository {
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError> {
        let created = sqlx::query_as::<_, Artwork>(
            "INSERT INTO artworks (title, image_url, user_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&artwork.title)
        .bind(&artwork.image_url)
        .bind(artwork.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Artwork>, AppError> {
        let artworks = sqlx::query_as::<_, Artwork>(
            "SELECT * FROM artworks ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(artworks)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Artwork>, AppError> {
        let artworks = sqlx::query_as::<_, Artwork>(
            "SELECT * FROM artworks WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(artworks)
    }

    async fn delete_owned(
        &self,
        id: Uuid,
        requester: Option<Uuid>,
    ) -> Result<Vec<Artwork>, AppError> {
        // Anonymous requests own nothing: `user_id = NULL` never matches.
        let deleted = sqlx::query_as::<_, Artwork>(
            "DELETE FROM artworks WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(requester)
        .fetch_all(&self.pool)
        .await?;
        Ok(deleted)
    }
}
