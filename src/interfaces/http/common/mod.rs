//! Building blocks shared by every HTTP module

pub mod api_response;
pub mod error;
pub mod json_body;

pub use api_response::ApiResponse;
pub use error::{api_error, status_for, ApiError, ApiResult};
pub use json_body::JsonBody;
