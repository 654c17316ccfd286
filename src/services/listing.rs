use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::ArtworkRepository;
use crate::errors::AppError;
use crate::models::artwork::Artwork;
use crate::models::user::Identity;
use crate::utils::time::time_ago;

pub const PUBLIC_FEED_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Public,
    Dashboard,
    Portfolio,
}

impl FeedKind {
    pub fn empty_message(self) -> &'static str {
        match self {
            FeedKind::Public | FeedKind::Portfolio => "No artworks found yet.",
            FeedKind::Dashboard => "No memories yet.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtworkView {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub uploaded_ago: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub kind: FeedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub items: Vec<ArtworkView>,
    pub count: usize,
    pub empty_message: Option<&'static str>,
}

impl Feed {
    fn build(kind: FeedKind, owner_id: Option<Uuid>, artworks: Vec<Artwork>, now: DateTime<Utc>) -> Self {
        let items: Vec<ArtworkView> = artworks
            .into_iter()
            .map(|artwork| ArtworkView {
                uploaded_ago: time_ago(artwork.created_at, now),
                artwork,
            })
            .collect();
        let count = items.len();

        Feed {
            kind,
            owner_id,
            empty_message: if count == 0 { Some(kind.empty_message()) } else { None },
            items,
            count,
        }
    }
}

pub struct ListingService {
    artworks: Arc<dyn ArtworkRepository>,
}

impl ListingService {
    pub fn new(artworks: Arc<dyn ArtworkRepository>) -> Self {
        Self { artworks }
    }

    pub async fn public_feed(&self) -> Result<Feed, AppError> {
        let artworks = self.artworks.list_recent(PUBLIC_FEED_LIMIT).await?;
        Ok(Feed::build(FeedKind::Public, None, artworks, Utc::now()))
    }

    pub async fn dashboard(&self, owner: &Identity) -> Result<Feed, AppError> {
        let artworks = self.artworks.list_by_owner(owner.user_id).await?;
        Ok(Feed::build(FeedKind::Dashboard, Some(owner.user_id), artworks, Utc::now()))
    }

    pub async fn portfolio(&self, owner_id: Uuid) -> Result<Feed, AppError> {
        let artworks = self.artworks.list_by_owner(owner_id).await?;
        Ok(Feed::build(FeedKind::Portfolio, Some(owner_id), artworks, Utc::now()))
    }
}
