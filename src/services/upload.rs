use log::{debug, info, warn};
use std::sync::Arc;

use crate::backend::{ArtworkRepository, ObjectStorage};
use crate::errors::AppError;
use crate::models::artwork::{Artwork, NewArtwork};
use crate::models::user::Identity;
use crate::storage::storage_path;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Size as sent by the client. Larger than `bytes.len()` when the
    /// reader stopped buffering an oversized part.
    pub size: usize,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            size: bytes.len(),
            bytes,
        }
    }
}

/// What the upload form submitted. Either part may be missing.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub title: String,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Title or file was missing; nothing happened.
    Skipped,
    Created(Artwork),
}

pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    artworks: Arc<dyn ArtworkRepository>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, artworks: Arc<dyn ArtworkRepository>, max_bytes: usize) -> Self {
        Self {
            storage,
            artworks,
            max_bytes,
        }
    }

    /// Presence is checked before size, so a blank form with a huge file is
    /// still a no-op.
    ///
    /// Stores the file, then records it. The two steps are not atomic: if the
    /// record insert fails the stored object stays behind.
    pub async fn upload(&self, owner: &Identity, form: UploadForm) -> Result<UploadOutcome, AppError> {
        let title = form.title.trim();
        let file = match form.file {
            Some(file) if file.size > 0 && !title.is_empty() => file,
            _ => {
                debug!("Upload from {} skipped: missing title or file", owner.user_id);
                return Ok(UploadOutcome::Skipped);
            }
        };

        if file.size > self.max_bytes || file.bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File size exceeds {} byte limit",
                self.max_bytes
            )));
        }

        let kind = infer::get(&file.bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| AppError::BadRequest("Only image files are allowed".to_string()))?;

        let path = storage_path(owner.user_id, &file.file_name, kind.extension());
        self.storage.upload(&path, file.bytes, kind.mime_type()).await?;

        let image_url = self.storage.public_url(&path).map_err(|err| {
            warn!("Object {} stored but has no public URL; it is orphaned: {}", path, err);
            err
        })?;

        let artwork = self
            .artworks
            .insert(NewArtwork {
                title: title.to_string(),
                image_url,
                user_id: owner.user_id,
            })
            .await
            .map_err(|err| {
                warn!("Object {} stored but its record failed; it is orphaned: {}", path, err);
                err
            })?;

        info!("User {} uploaded artwork {} ({})", owner.user_id, artwork.id, path);
        Ok(UploadOutcome::Created(artwork))
    }
}
