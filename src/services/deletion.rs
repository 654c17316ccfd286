use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::ArtworkRepository;
use crate::errors::AppError;
use crate::models::artwork::Artwork;
use crate::models::user::Identity;

pub const PERMISSION_DENIED: &str = "Deletion failed. You might not have permission to delete this item.";

pub struct DeletionService {
    artworks: Arc<dyn ArtworkRepository>,
}

impl DeletionService {
    pub fn new(artworks: Arc<dyn ArtworkRepository>) -> Self {
        Self { artworks }
    }

    /// Deletes an artwork on behalf of `requester`.
    ///
    /// The store only removes rows the requester owns and reports what it
    /// removed. An empty report is treated as a refusal, not a success.
    pub async fn delete(&self, requester: Option<&Identity>, artwork_id: Uuid) -> Result<Artwork, AppError> {
        let requester_id = requester.map(|identity| identity.user_id);
        let mut deleted = self.artworks.delete_owned(artwork_id, requester_id).await?;

        match deleted.pop() {
            Some(artwork) => {
                info!("Artwork {} deleted by {}", artwork.id, artwork.user_id);
                Ok(artwork)
            }
            None => {
                warn!(
                    "Delete of artwork {} by {:?} affected no rows",
                    artwork_id, requester_id
                );
                Err(AppError::Forbidden(PERMISSION_DENIED.to_string()))
            }
        }
    }
}
