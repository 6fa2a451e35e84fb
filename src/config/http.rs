use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// HTTP surface settings: CORS, body limit, response headers, rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Origins allowed to make credentialed cross-origin requests.
    /// Empty means any origin without credentials.
    /// TOML: `http.cors_allowed_origins`. Env: `CORS_ALLOWED_ORIGINS` (comma-separated).
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Maximum accepted request body size. Default: 10 MiB.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Attach `nosniff`, frame and referrer headers to every response.
    #[serde(default = "default_true")]
    pub security_headers: bool,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: Vec::new(),
            body_limit_bytes: default_body_limit(),
            security_headers: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Per-client request quota, keyed by peer IP. Peers idle for longer than a
/// refill window are dropped from the store every minute.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Disabled by default.
    #[serde(default)]
    pub enabled: bool,

    /// Sustained requests per minute for a single client.
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,

    /// Requests a client may send back-to-back before the quota applies.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            per_minute: default_per_minute(),
            burst: default_burst(),
        }
    }
}

/// Accepts either a list or a single comma-separated string.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    let raw: Vec<String> = match v {
        Value::Null => Vec::new(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(serde::de::Error::custom(format!(
                    "expected a string origin, got {other}"
                ))),
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(serde::de::Error::custom(
                "expected a list or a comma-separated string for cors_allowed_origins",
            ));
        }
    };

    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_per_minute() -> u32 {
    30
}

fn default_burst() -> u32 {
    30
}
