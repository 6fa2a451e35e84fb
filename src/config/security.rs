use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder signing secret used when `SECRET_KEY` is not provided.
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-here";

/// Placeholder JWT secret used when `JWT_SECRET_KEY` is not provided.
pub const DEFAULT_JWT_SECRET_KEY: &str = "jwt-secret-key";

/// Secrets and token lifetimes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Application secret; the private cookie key is derived from it.
    /// TOML: `security.secret_key`. Env: `SECRET_KEY`.
    #[serde(default = "default_secret_key")]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub secret_key: String,

    /// HMAC secret for signing and verifying JWTs.
    /// TOML: `security.jwt_secret_key`. Env: `JWT_SECRET_KEY`.
    #[serde(default = "default_jwt_secret_key")]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub jwt_secret_key: String,

    /// Access token lifetime in seconds. Default: 15 minutes.
    #[serde(default = "default_access_expires")]
    pub jwt_access_token_expires_secs: u64,

    /// Refresh token lifetime in seconds. Default: 30 days.
    #[serde(default = "default_refresh_expires")]
    pub jwt_refresh_token_expires_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            jwt_secret_key: default_jwt_secret_key(),
            jwt_access_token_expires_secs: default_access_expires(),
            jwt_refresh_token_expires_secs: default_refresh_expires(),
        }
    }
}

impl SecurityConfig {
    /// Names of the secrets that still carry their built-in placeholder value.
    pub fn uses_insecure_defaults(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.secret_key == DEFAULT_SECRET_KEY {
            names.push("SECRET_KEY");
        }
        if self.jwt_secret_key == DEFAULT_JWT_SECRET_KEY {
            names.push("JWT_SECRET_KEY");
        }
        names
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for a secret key",
        )),
    }
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_jwt_secret_key() -> String {
    DEFAULT_JWT_SECRET_KEY.to_string()
}

fn default_access_expires() -> u64 {
    15 * 60
}

fn default_refresh_expires() -> u64 {
    30 * 24 * 60 * 60
}
