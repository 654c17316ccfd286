use std::sync::Arc;

use crate::backend::{ArtworkRepository, ObjectStorage, UserRepository};
use crate::services::{AuthService, DeletionService, ListingService, SessionService, UploadService};
use crate::utils::jwt::JwtKeys;

/// Knobs the services need, separated from `Config` so tests can build
/// state without touching the environment.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub max_upload_bytes: usize,
    pub confirmation_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub auth: Arc<AuthService>,
    pub uploads: Arc<UploadService>,
    pub listings: Arc<ListingService>,
    pub deletions: Arc<DeletionService>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        artworks: Arc<dyn ArtworkRepository>,
        storage: Arc<dyn ObjectStorage>,
        settings: StateSettings,
    ) -> Self {
        let sessions = Arc::new(SessionService::new(JwtKeys::new(
            &settings.jwt_secret,
            settings.jwt_expiration_hours,
        )));

        Self {
            auth: Arc::new(AuthService::new(
                users,
                Arc::clone(&sessions),
                settings.confirmation_url,
            )),
            uploads: Arc::new(UploadService::new(
                storage,
                Arc::clone(&artworks),
                settings.max_upload_bytes,
            )),
            listings: Arc::new(ListingService::new(Arc::clone(&artworks))),
            deletions: Arc::new(DeletionService::new(artworks)),
            sessions,
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}
