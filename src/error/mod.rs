mod app;
mod jwt;

pub use app::{ApiErrorBody, ApiErrorObject, AppError};
pub use jwt::JwtRejection;
