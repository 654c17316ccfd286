use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::backend::UserRepository;
use crate::errors::AppError;
use crate::models::user::{Identity, NewUser};
use crate::services::session::{AuthEventKind, Session, SessionService};
use crate::utils::jwt::Claims;

const CONFIRMATION_TOKEN_LEN: usize = 48;
pub const CONFIRMATION_SENT: &str = "Check your email for the confirmation link!";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub message: &'static str,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub user: Identity,
    /// Where the sign-up form asked the user to land afterwards.
    pub redirect_to: Option<String>,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionService>,
    confirmation_url: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<SessionService>, confirmation_url: String) -> Self {
        Self {
            users,
            sessions,
            confirmation_url,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::InternalServerError("Invalid password hash".to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !user.is_confirmed() {
            return Err(AppError::Unauthorized("Email not confirmed".to_string()));
        }

        let identity = user.identity();
        let session = self.sessions.issue(&identity)?;
        self.sessions.publish(AuthEventKind::SignedIn, identity.user_id);
        info!("User {} signed in", identity.user_id);
        Ok(session)
    }

    /// Registers an unconfirmed account. No session is created until the
    /// emailed link is followed and the user signs in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("User already registered".to_string()));
        }

        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AppError::InternalServerError("Hashing error".to_string()))?
            .to_string();

        let confirmation_token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CONFIRMATION_TOKEN_LEN)
            .map(char::from)
            .collect();

        let user = self
            .users
            .insert(NewUser {
                email: email.to_string(),
                password_hash,
                confirmation_token: confirmation_token.clone(),
            })
            .await?;

        let link = self.confirmation_link(&confirmation_token, redirect_to)?;
        // Mail delivery is handled outside this service; the link is logged for it.
        info!("Confirmation link for {} ({}): {}", user.email, user.user_id, link);

        Ok(SignUpOutcome {
            message: CONFIRMATION_SENT,
            email: user.email,
        })
    }

    pub async fn confirm(&self, token: &str, redirect_to: Option<String>) -> Result<ConfirmOutcome, AppError> {
        let user = self
            .users
            .confirm(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Confirmation link is invalid or has expired".to_string()))?;

        info!("User {} confirmed their email", user.user_id);
        Ok(ConfirmOutcome {
            user: user.identity(),
            redirect_to,
        })
    }

    pub fn refresh(&self, claims: &Claims) -> Result<Session, AppError> {
        let identity = claims
            .identity()
            .ok_or_else(|| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

        let session = self.sessions.issue(&identity)?;
        self.sessions.revoke(claims)?;
        self.sessions.publish(AuthEventKind::TokenRefreshed, identity.user_id);
        Ok(session)
    }

    pub fn sign_out(&self, claims: &Claims) -> Result<(), AppError> {
        self.sessions.revoke(claims)?;
        match claims.identity() {
            Some(identity) => {
                self.sessions.publish(AuthEventKind::SignedOut, identity.user_id);
                info!("User {} signed out", identity.user_id);
            }
            None => warn!("Signed out a token without a valid subject"),
        }
        Ok(())
    }

    fn confirmation_link(&self, token: &str, redirect_to: Option<&str>) -> Result<Url, AppError> {
        let mut link = Url::parse(&self.confirmation_url)
            .map_err(|err| AppError::ConfigError(format!("Invalid confirmation URL: {}", err)))?;
        {
            let mut query = link.query_pairs_mut();
            query.append_pair("token", token);
            if let Some(target) = redirect_to {
                query.append_pair("redirect_to", target);
            }
        }
        Ok(link)
    }
}
