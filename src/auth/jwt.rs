use crate::config::SecurityConfig;
use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Registered and private claims carried by every token this service issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub fresh: bool,
    pub iat: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens signed with `security.jwt_secret_key`.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtManager {
    pub fn new(cfg: &SecurityConfig) -> Self {
        let secret = cfg.jwt_secret_key.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl_secs: i64::try_from(cfg.jwt_access_token_expires_secs).unwrap_or(i64::MAX),
            refresh_ttl_secs: i64::try_from(cfg.jwt_refresh_token_expires_secs)
                .unwrap_or(i64::MAX),
        }
    }

    pub fn create_access_token(&self, identity: &str, fresh: bool) -> Result<String, AppError> {
        let claims = claims_for(identity, TokenType::Access, fresh, self.access_ttl_secs);
        self.encode(&claims)
    }

    /// Refresh tokens are never fresh.
    pub fn create_refresh_token(&self, identity: &str) -> Result<String, AppError> {
        let claims = claims_for(identity, TokenType::Refresh, false, self.refresh_ttl_secs);
        self.encode(&claims)
    }

    /// Signs an arbitrary claim set.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Verifies signature, `exp` and `nbf`, and returns the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

fn claims_for(identity: &str, token_type: TokenType, fresh: bool, ttl: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        fresh,
        iat: now,
        jti: Uuid::new_v4().to_string(),
        token_type,
        sub: identity.to_string(),
        nbf: now,
        exp: now.saturating_add(ttl),
    }
}
