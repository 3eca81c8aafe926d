pub mod auth;
pub mod response;

pub use auth::require_bearer;
pub use response::{ApiResponse, ApiResult};
