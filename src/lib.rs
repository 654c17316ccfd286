pub mod backend;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

use actix_web::web;

/// Registers every route. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(handlers::artwork::public_feed)),
    )
    .service(
        web::resource("/login")
            .route(web::post().to(handlers::auth::sign_in)),
    )
    .service(
        web::resource("/signup")
            .route(web::post().to(handlers::auth::sign_up)),
    )
    .service(
        web::resource("/profile")
            .route(web::get().to(handlers::profile::dashboard)),
    )
    .service(
        web::resource("/profile/{owner_id}")
            .route(web::get().to(handlers::profile::portfolio)),
    )
    .service(
        web::resource("/v1/auth/login")
            .route(web::post().to(handlers::auth::sign_in)),
    )
    .service(
        web::resource("/v1/auth/signup")
            .route(web::post().to(handlers::auth::sign_up)),
    )
    .service(
        web::resource("/v1/auth/confirm")
            .route(web::get().to(handlers::auth::confirm)),
    )
    .service(
        web::resource("/v1/auth/refresh")
            .route(web::post().to(handlers::auth::refresh)),
    )
    .service(
        web::resource("/v1/auth/logout")
            .route(web::post().to(handlers::auth::sign_out)),
    )
    .service(
        web::resource("/v1/session")
            .route(web::get().to(handlers::session::current_session)),
    )
    .service(
        web::resource("/v1/session/events")
            .route(web::get().to(handlers::session::auth_events)),
    )
    .service(
        web::resource("/v1/artworks")
            .route(web::get().to(handlers::artwork::public_feed))
            .route(web::post().to(handlers::artwork::upload_artwork)),
    )
    .service(
        web::resource("/v1/artworks/{id}")
            .route(web::delete().to(handlers::artwork::delete_artwork)),
    )
    .service(
        web::resource("/v1/profile")
            .route(web::get().to(handlers::profile::dashboard)),
    )
    .service(
        web::resource("/v1/profile/{owner_id}")
            .route(web::get().to(handlers::profile::portfolio)),
    );
}
