use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::errors::AppError;
use crate::models::user::Identity;
use crate::state::AppState;
use crate::utils::jwt::{bearer_token, Claims};

/// Extractor for handlers that need a signed-in caller. Wrap it in
/// `Option` where anonymous callers are allowed.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    pub claims: Claims,
}

pub fn request_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|auth| auth.to_str().ok())
        .and_then(bearer_token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalServerError("Application state missing".to_string()))?;

    let token = request_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
    let claims = state.sessions.claims_for(token)?;
    let identity = claims
        .identity()
        .ok_or_else(|| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

    Ok(AuthenticatedUser { identity, claims })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
