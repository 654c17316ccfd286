use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Identity;
use crate::utils::jwt::{Claims, JwtKeys};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Where a client goes after signing in.
pub const DASHBOARD_PATH: &str = "/profile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: Identity,
    pub redirect_to: &'static str,
}

/// Resolves tokens to identities and fans out auth-state changes.
pub struct SessionService {
    keys: JwtKeys,
    events: broadcast::Sender<AuthEvent>,
    // jti -> exp
    revoked: Mutex<HashMap<Uuid, usize>>,
}

impl SessionService {
    pub fn new(keys: JwtKeys) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            keys,
            events,
            revoked: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<Session, AppError> {
        let (access_token, claims) = self
            .keys
            .generate_token(identity)
            .map_err(|_| AppError::InternalServerError("Token generation error".to_string()))?;

        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .ok_or_else(|| AppError::InternalServerError("Invalid token expiry".to_string()))?;

        Ok(Session {
            access_token,
            token_type: "bearer",
            expires_at,
            user: identity.clone(),
            redirect_to: DASHBOARD_PATH,
        })
    }

    /// Validates the token and checks it has not been signed out.
    pub fn claims_for(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self
            .keys
            .validate_token(token)
            .map_err(|err| AppError::Unauthorized(err.to_string()))?;

        if self.is_revoked(&claims)? {
            return Err(AppError::Unauthorized("Token has been revoked".to_string()));
        }
        Ok(claims)
    }

    /// Any failure to resolve the token reads as "signed out".
    pub fn current_identity(&self, token: Option<&str>) -> Option<Identity> {
        let claims = self.claims_for(token?).ok()?;
        claims.identity()
    }

    pub fn revoke(&self, claims: &Claims) -> Result<(), AppError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let mut revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::InternalServerError("Session state poisoned".to_string()))?;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti, claims.exp);
        Ok(())
    }

    /// False once the token has been signed out or swapped by a refresh.
    pub fn is_active(&self, claims: &Claims) -> bool {
        matches!(self.is_revoked(claims), Ok(false))
    }

    fn is_revoked(&self, claims: &Claims) -> Result<bool, AppError> {
        let revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::InternalServerError("Session state poisoned".to_string()))?;
        Ok(revoked.contains_key(&claims.jti))
    }

    pub fn publish(&self, kind: AuthEventKind, user_id: Uuid) {
        let event = AuthEvent {
            kind,
            user_id,
            occurred_at: Utc::now(),
        };
        // Err only means nobody is listening.
        if self.events.send(event).is_err() {
            debug!("No auth subscribers for {:?} on {}", kind, user_id);
        }
    }

    pub fn subscribe(&self, user_id: Uuid) -> AuthSubscription {
        debug!("Auth subscription opened for {}", user_id);
        AuthSubscription {
            user_id,
            receiver: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// A standing subscription to one identity's auth events. Dropping it
/// releases the channel slot.
pub struct AuthSubscription {
    user_id: Uuid,
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event for this identity, or `None` once the service is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.user_id == self.user_id => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Auth subscriber for {} skipped {} events", self.user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        debug!("Auth subscription released for {}", self.user_id);
    }
}
