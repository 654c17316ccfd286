//! Seams between the workflows and the systems that hold state.
//!
//! Postgres implementations live in `crate::db`, the S3 implementation in
//! `crate::storage`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::artwork::{Artwork, NewArtwork};
use crate::models::user::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Marks the user holding `token` as confirmed and clears the token.
    async fn confirm(&self, token: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError>;

    /// Newest first across all owners, at most `limit` rows.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Artwork>, AppError>;

    /// Newest first, only rows owned by `user_id`.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Artwork>, AppError>;

    /// Deletes `id` if and only if it is owned by `requester` and returns
    /// the deleted rows. Rows the requester may not delete are left alone
    /// and the result is empty rather than an error.
    async fn delete_owned(
        &self,
        id: Uuid,
        requester: Option<Uuid>,
    ) -> Result<Vec<Artwork>, AppError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    fn public_url(&self, path: &str) -> Result<String, AppError>;
}
