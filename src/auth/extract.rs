use super::jwt::{Claims, JwtManager, TokenType};
use crate::error::JwtRejection;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use std::sync::Arc;

/// Claims of a verified access token taken from `Authorization: Bearer`.
///
/// Refresh tokens are rejected.
#[derive(Debug, Clone)]
pub struct AccessClaims(pub Claims);

impl<S> FromRequestParts<S> for AccessClaims
where
    S: Send + Sync,
    Arc<JwtManager>: FromRef<S>,
{
    type Rejection = JwtRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Err(JwtRejection::MissingHeader);
        }
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(JwtRejection::BadHeader)?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        let claims = jwt.decode(bearer.token())?;
        if claims.token_type != TokenType::Access {
            return Err(JwtRejection::WrongTokenType);
        }
        Ok(AccessClaims(claims))
    }
}
