use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::upload::{UploadForm, UploadOutcome, UploadedFile};
use crate::state::AppState;
use crate::utils::auth::AuthenticatedUser;

pub fn parse_artwork_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid artwork ID".to_string()))
}

pub async fn public_feed(state: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    let feed = state.listings.public_feed().await?;
    Ok(HttpResponse::Ok().json(feed))
}

async fn read_upload_form(mut payload: Multipart, max_bytes: usize) -> Result<UploadForm, actix_web::Error> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let (name, file_name) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().map(str::to_owned),
                disposition.get_filename().map(str::to_owned),
            )
        };

        // Past the limit the part is drained but not buffered; the service
        // decides between a no-op and a size error.
        let mut bytes = Vec::new();
        let mut size = 0;
        while let Some(chunk) = field.try_next().await? {
            size += chunk.len();
            if size <= max_bytes {
                bytes.extend_from_slice(&chunk);
            }
        }

        match name.as_deref() {
            Some("title") => {
                if size > max_bytes {
                    return Err(AppError::BadRequest("Title is too long".to_string()).into());
                }
                form.title = String::from_utf8(bytes)
                    .map_err(|_| AppError::BadRequest("Title must be valid UTF-8".to_string()))?;
            }
            Some("file") => {
                form.file = Some(UploadedFile {
                    file_name: file_name.unwrap_or_default(),
                    bytes,
                    size,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

pub async fn upload_artwork(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let form = read_upload_form(payload, state.max_upload_bytes).await?;

    match state.uploads.upload(&user.identity, form).await? {
        UploadOutcome::Skipped => Ok(HttpResponse::NoContent().finish()),
        UploadOutcome::Created(artwork) => Ok(HttpResponse::Created().json(artwork)),
    }
}

pub async fn delete_artwork(
    user: Option<AuthenticatedUser>,
    state: web::Data<AppState>,
    artwork_id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let artwork_id = parse_artwork_id(&artwork_id.into_inner())?;
    let requester = user.as_ref().map(|user| &user.identity);

    let deleted = state.deletions.delete(requester, artwork_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "deleted": deleted,
    })))
}
