use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::stream;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

use crate::services::session::{AuthEventKind, AuthSubscription, SessionService};
use crate::state::AppState;
use crate::utils::auth::{request_token, AuthenticatedUser};
use crate::utils::jwt::Claims;

pub async fn current_session(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = state.sessions.current_identity(request_token(&req));
    HttpResponse::Ok().json(json!({ "user": user }))
}

struct EventStream {
    subscription: AuthSubscription,
    sessions: Arc<SessionService>,
    claims: Claims,
    finished: bool,
}

/// Server-sent stream of auth-state changes for the caller. The
/// subscription lives as long as the connection, and the stream ends after
/// the event that revoked the caller's own token.
pub async fn auth_events(user: AuthenticatedUser, state: web::Data<AppState>) -> HttpResponse {
    let initial = EventStream {
        subscription: state.sessions.subscribe(user.identity.user_id),
        sessions: Arc::clone(&state.sessions),
        claims: user.claims,
        finished: false,
    };

    let events = stream::unfold(initial, |mut current| async move {
        if current.finished {
            return None;
        }
        let event = current.subscription.next().await?;
        if matches!(event.kind, AuthEventKind::SignedOut | AuthEventKind::TokenRefreshed)
            && !current.sessions.is_active(&current.claims)
        {
            current.finished = true;
        }

        let payload = serde_json::to_string(&event).ok()?;
        let frame = web::Bytes::from(format!("event: auth\ndata: {}\n\n", payload));
        Some((Ok::<_, Infallible>(frame), current))
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}
