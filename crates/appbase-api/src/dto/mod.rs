//! Request and response DTOs.

pub mod request;
pub mod response;

pub use request::validate_request;
pub use response::ApiResponse;
