use actix_web::http::header;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::utils::auth::AuthenticatedUser;

pub const LOGIN_PATH: &str = "/login";

/// The caller's own collection. Anonymous callers are sent to the login page.
pub async fn dashboard(
    user: Option<AuthenticatedUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let Some(user) = user else {
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish());
    };

    let feed = state.listings.dashboard(&user.identity).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub async fn portfolio(
    state: web::Data<AppState>,
    owner_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let owner_id = Uuid::parse_str(&owner_id.into_inner())
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let feed = state.listings.portfolio(owner_id).await?;
    Ok(HttpResponse::Ok().json(feed))
}
