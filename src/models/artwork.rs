use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Artwork {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the uploader. `id` and `created_at` come from the store.
#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub title: String,
    pub image_url: String,
    pub user_id: Uuid,
}
