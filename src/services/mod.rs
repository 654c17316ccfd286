pub mod auth;
pub mod deletion;
pub mod listing;
pub mod session;
pub mod upload;

pub use auth::AuthService;
pub use deletion::DeletionService;
pub use listing::ListingService;
pub use session::SessionService;
pub use upload::UploadService;
