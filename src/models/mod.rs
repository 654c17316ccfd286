pub mod artwork;
pub mod user;
