pub mod auth;
pub mod jwt;
pub mod time;
pub mod validation;
