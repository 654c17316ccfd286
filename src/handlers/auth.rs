use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthenticatedUser;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 72))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6, max = 72))]
    password: String,
    redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    token: String,
    redirect_to: Option<String>,
}

pub async fn sign_in(
    req: web::Json<SignInRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    validate_payload(&req.0)?;

    let session = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn sign_up(
    req: web::Json<SignUpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    validate_payload(&req.0)?;

    let outcome = state
        .auth
        .sign_up(&req.email, &req.password, req.redirect_to.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(outcome))
}

pub async fn confirm(
    query: web::Query<ConfirmQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let query = query.into_inner();
    let outcome = state.auth.confirm(&query.token, query.redirect_to).await?;

    // The target comes from the sign-up request, so only same-site paths are followed.
    match outcome.redirect_to.as_deref().and_then(local_redirect) {
        Some(target) => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, target))
            .finish()),
        None => Ok(HttpResponse::Ok().json(&outcome)),
    }
}

fn local_redirect(target: &str) -> Option<&str> {
    let local = target.starts_with('/') && !target.starts_with("//") && !target.contains('\\');
    local.then_some(target)
}

pub async fn refresh(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let session = state.auth.refresh(&user.claims)?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn sign_out(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    state.auth.sign_out(&user.claims)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Signed out",
    })))
}

#[cfg(test)]
mod tests {
    use super::local_redirect;

    #[test]
    fn only_same_site_paths_are_followed() {
        assert_eq!(local_redirect("/profile"), Some("/profile"));
        assert_eq!(local_redirect("/profile?tab=1"), Some("/profile?tab=1"));
        assert_eq!(local_redirect("https://evil.example/"), None);
        assert_eq!(local_redirect("//evil.example"), None);
        assert_eq!(local_redirect("/\\evil.example"), None);
        assert_eq!(local_redirect("profile"), None);
    }
}
