use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use serde_json::json;
use thiserror::Error as ThisError;

use super::AppError;

/// Rejection produced when a request carries no usable access token.
///
/// Bodies follow the `{"msg": "..."}` shape admin-panel clients already parse.
#[derive(Debug, ThisError)]
pub enum JwtRejection {
    #[error("Missing Authorization Header")]
    MissingHeader,

    #[error("Bad Authorization header. Expected 'Authorization: Bearer <JWT>'")]
    BadHeader,

    #[error("Token has expired")]
    Expired,

    #[error("Only access tokens are allowed")]
    WrongTokenType,

    #[error("{0}")]
    Invalid(String),
}

impl JwtRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            JwtRejection::MissingHeader | JwtRejection::BadHeader | JwtRejection::Expired => {
                StatusCode::UNAUTHORIZED
            }
            JwtRejection::WrongTokenType | JwtRejection::Invalid(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl From<JwtError> for JwtRejection {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtRejection::Expired,
            ErrorKind::InvalidSignature => {
                JwtRejection::Invalid("Signature verification failed".to_string())
            }
            ErrorKind::ImmatureSignature => {
                JwtRejection::Invalid("The token is not yet valid (nbf)".to_string())
            }
            ErrorKind::InvalidToken => JwtRejection::Invalid("Not enough segments".to_string()),
            _ => JwtRejection::Invalid(err.to_string()),
        }
    }
}

impl From<AppError> for JwtRejection {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Jwt(inner) => inner.into(),
            other => JwtRejection::Invalid(other.to_string()),
        }
    }
}

impl IntoResponse for JwtRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "msg": self.to_string() }))).into_response()
    }
}
