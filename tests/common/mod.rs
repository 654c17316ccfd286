//! In-memory backends and fixtures shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use gallery_backend::backend::{ArtworkRepository, ObjectStorage, UserRepository};
use gallery_backend::errors::AppError;
use gallery_backend::models::artwork::{Artwork, NewArtwork};
use gallery_backend::models::user::{Identity, NewUser, User};
use gallery_backend::state::{AppState, StateSettings};

pub const TEST_PASSWORD: &str = "hunter22";

/// A PNG signature is all `infer` needs.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn confirmation_token(&self, email: &str) -> Option<String> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .and_then(|user| user.confirmation_token.clone())
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|user| user.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|existing| existing.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict("User already registered".to_string()));
        }
        let created = User {
            user_id: Uuid::new_v4(),
            email: user.email,
            password: user.password_hash,
            confirmation_token: Some(user.confirmation_token),
            confirmed_at: None,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn confirm(&self, token: &str) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users
            .iter_mut()
            .find(|user| user.confirmation_token.as_deref() == Some(token))
        else {
            return Ok(None);
        };
        user.confirmation_token = None;
        user.confirmed_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }
}

#[derive(Default)]
pub struct MemoryArtworks {
    rows: Mutex<Vec<Artwork>>,
    last_created: Mutex<Option<DateTime<Utc>>>,
    pub fail_inserts: AtomicBool,
}

impl MemoryArtworks {
    /// Strictly increasing, so ordering by `created_at` is total.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_created.lock().unwrap();
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::milliseconds(1);
            }
        }
        *last = Some(now);
        now
    }

    pub fn all(&self) -> Vec<Artwork> {
        self.rows.lock().unwrap().clone()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.rows.lock().unwrap().iter().any(|row| row.id == id)
    }

    fn sorted(mut rows: Vec<Artwork>) -> Vec<Artwork> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl ArtworkRepository for MemoryArtworks {
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("insert rejected".to_string()));
        }
        let created = Artwork {
            id: Uuid::new_v4(),
            title: artwork.title,
            image_url: artwork.image_url,
            user_id: artwork.user_id,
            created_at: self.next_timestamp(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Artwork>, AppError> {
        let mut rows = Self::sorted(self.all());
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Artwork>, AppError> {
        let rows = self.all().into_iter().filter(|row| row.user_id == user_id).collect();
        Ok(Self::sorted(rows))
    }

    async fn delete_owned(&self, id: Uuid, requester: Option<Uuid>) -> Result<Vec<Artwork>, AppError> {
        let Some(requester) = requester else {
            return Ok(Vec::new());
        };
        let mut rows = self.rows.lock().unwrap();
        let (deleted, kept): (Vec<Artwork>, Vec<Artwork>) = rows
            .drain(..)
            .partition(|row| row.id == id && row.user_id == requester);
        *rows = kept;
        Ok(deleted)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    pub fail_uploads: AtomicBool,
}

impl MemoryStorage {
    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects.lock().unwrap().get(path).map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::StorageError("The resource already exists".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<String, AppError> {
        Ok(format!("https://storage.test/showcase-images/{}", path))
    }
}

pub struct TestBackend {
    pub users: Arc<MemoryUsers>,
    pub artworks: Arc<MemoryArtworks>,
    pub storage: Arc<MemoryStorage>,
    pub state: AppState,
}

pub fn settings() -> StateSettings {
    StateSettings {
        jwt_secret: "test-secret-key".to_string(),
        jwt_expiration_hours: 1,
        max_upload_bytes: 1024,
        confirmation_url: "http://localhost:8080/v1/auth/confirm".to_string(),
    }
}

pub fn backend() -> TestBackend {
    let users = Arc::new(MemoryUsers::default());
    let artworks = Arc::new(MemoryArtworks::default());
    let storage = Arc::new(MemoryStorage::default());

    let state = AppState::new(
        users.clone() as Arc<dyn UserRepository>,
        artworks.clone() as Arc<dyn ArtworkRepository>,
        storage.clone() as Arc<dyn ObjectStorage>,
        settings(),
    );

    TestBackend {
        users,
        artworks,
        storage,
        state,
    }
}

impl TestBackend {
    /// Signs up, confirms and signs in. Returns the identity and its token.
    pub async fn confirmed_user(&self, email: &str) -> (Identity, String) {
        self.state.auth.sign_up(email, TEST_PASSWORD, None).await.unwrap();
        let token = self.users.confirmation_token(email).unwrap();
        self.state.auth.confirm(&token, None).await.unwrap();
        let session = self.state.auth.sign_in(email, TEST_PASSWORD).await.unwrap();
        (session.user, session.access_token)
    }
}

pub const BOUNDARY: &str = "gallery-test-boundary";

/// Builds a `multipart/form-data` body with optional `title` and `file` parts.
pub fn multipart_body(title: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"title\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
                BOUNDARY, title
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
