mod basic;
mod http;
mod security;

pub use basic::BasicConfig;
pub use http::{HttpConfig, RateLimitConfig};
pub use security::{DEFAULT_JWT_SECRET_KEY, DEFAULT_SECRET_KEY, SecurityConfig};

use crate::error::AppError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};
use url::Url;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Secrets and token lifetimes (see `security` table in config.toml).
    #[serde(default)]
    pub security: SecurityConfig,

    /// CORS and other HTTP layers (see `http` table in config.toml).
    #[serde(default)]
    pub http: HttpConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Flat environment variables and the config key each one overrides.
const ENV_KEYS: &[(&str, &str)] = &[
    ("SECRET_KEY", "security.secret_key"),
    ("JWT_SECRET_KEY", "security.jwt_secret_key"),
    ("DATABASE_URL", "basic.database_url"),
    ("LISTEN_ADDR", "basic.listen_addr"),
    ("LISTEN_PORT", "basic.listen_port"),
    ("LOGLEVEL", "basic.loglevel"),
    ("CORS_ALLOWED_ORIGINS", "http.cors_allowed_origins"),
];

/// Secrets are taken verbatim; Figment's value sniffing would turn `007`
/// into `7` or `true` into a bool.
const RAW_STRING_ENV_KEYS: &[&str] = &["SECRET_KEY", "JWT_SECRET_KEY"];

fn dotted_key(env_name: &str) -> Option<&'static str> {
    ENV_KEYS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(env_name))
        .map(|(_, dotted)| *dotted)
}

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, and the
    /// process environment, in that order.
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }

        let typed: Vec<&str> = ENV_KEYS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !RAW_STRING_ENV_KEYS.contains(name))
            .collect();
        figment = figment.merge(Env::raw().only(&typed).map(|key| {
            dotted_key(key.as_str())
                .map_or_else(|| key.as_str().to_string(), str::to_string)
                .into()
        }));

        for (name, value) in Env::raw().only(RAW_STRING_ENV_KEYS).iter() {
            if let Some(dotted) = dotted_key(name.as_str()) {
                figment = figment.merge(Serialized::default(dotted, value));
            }
        }
        figment
    }

    /// Extracts and validates a configuration from any Figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, AppError> {
        let mut cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads configuration from defaults, `config.toml` and the environment.
    pub fn load() -> Result<Self, AppError> {
        Self::from_figment(&Self::figment())
    }

    /// Socket the HTTP server binds to.
    pub fn listen_socket(&self) -> SocketAddr {
        SocketAddr::from((self.basic.listen_addr, self.basic.listen_port))
    }

    fn validate(&mut self) -> Result<(), AppError> {
        if self.security.secret_key.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "security.secret_key must be non-empty".to_string(),
            ));
        }
        if self.security.jwt_secret_key.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "security.jwt_secret_key must be non-empty".to_string(),
            ));
        }

        self.http.cors_allowed_origins = self
            .http
            .cors_allowed_origins
            .iter()
            .map(|raw| normalize_origin(raw))
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}

/// Reduces `https://admin.example.com/` to `https://admin.example.com`.
fn normalize_origin(raw: &str) -> Result<String, AppError> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::InvalidConfig(format!("invalid CORS origin {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(AppError::InvalidConfig(format!(
            "CORS origin {raw:?} must be an http(s) URL with a host"
        )));
    }
    Ok(url.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    #[test]
    fn defaults_match_the_bootstrap_values() {
        let cfg = Config::from_figment(&base()).expect("defaults are valid");

        assert_eq!(
            cfg.listen_socket(),
            SocketAddr::from((IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000))
        );
        assert_eq!(cfg.basic.database_url, "sqlite://admin_panel.db");
        assert_eq!(cfg.security.secret_key, DEFAULT_SECRET_KEY);
        assert_eq!(cfg.security.jwt_secret_key, DEFAULT_JWT_SECRET_KEY);
        assert_eq!(cfg.security.jwt_access_token_expires_secs, 900);
        assert!(cfg.http.cors_allowed_origins.is_empty());
        assert!(!cfg.http.rate_limit.enabled);
        assert_eq!(
            cfg.security.uses_insecure_defaults(),
            vec!["SECRET_KEY", "JWT_SECRET_KEY"]
        );
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = base().merge(Toml::string(
            r#"
            [basic]
            listen_port = 8080
            database_url = "sqlite::memory:"

            [security]
            secret_key = 12345
            jwt_secret_key = "s3cret"

            [http]
            cors_allowed_origins = ["http://localhost:3000/", "https://admin.example.com"]
            "#,
        ));
        let cfg = Config::from_figment(&figment).expect("valid config");

        assert_eq!(cfg.basic.listen_port, 8080);
        assert_eq!(cfg.basic.database_url, "sqlite::memory:");
        assert_eq!(cfg.security.secret_key, "12345");
        assert!(cfg.security.uses_insecure_defaults().is_empty());
        assert_eq!(
            cfg.http.cors_allowed_origins,
            vec!["http://localhost:3000", "https://admin.example.com"]
        );
    }

    #[test]
    fn comma_separated_origins_are_split() {
        let figment = base().merge((
            "http.cors_allowed_origins",
            " http://localhost:3000 ,http://localhost:3001,",
        ));
        let cfg = Config::from_figment(&figment).expect("valid config");
        assert_eq!(
            cfg.http.cors_allowed_origins,
            vec!["http://localhost:3000", "http://localhost:3001"]
        );
    }

    #[test]
    fn rejects_non_http_origin() {
        let figment = base().merge(("http.cors_allowed_origins", "ftp://files.example.com"));
        let err = Config::from_figment(&figment).expect_err("ftp origin must fail");
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_blank_jwt_secret() {
        let figment = base().merge(("security.jwt_secret_key", "   "));
        let err = Config::from_figment(&figment).expect_err("blank secret must fail");
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn secret_env_vars_are_read_verbatim() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JWT_SECRET_KEY", "007");
            jail.set_env("SECRET_KEY", "true");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.security.jwt_secret_key, "007");
            assert_eq!(cfg.security.secret_key, "true");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [basic]
                listen_port = 7000
                loglevel = "debug"
                "#,
            )?;
            jail.set_env("SECRET_KEY", "from-env");
            jail.set_env("DATABASE_URL", "sqlite://x.db");
            jail.set_env("LISTEN_PORT", "8081");
            jail.set_env(
                "CORS_ALLOWED_ORIGINS",
                "http://a.example,http://b.example/",
            );

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.security.secret_key, "from-env");
            assert_eq!(cfg.security.jwt_secret_key, DEFAULT_JWT_SECRET_KEY);
            assert_eq!(cfg.basic.database_url, "sqlite://x.db");
            assert_eq!(cfg.basic.listen_port, 8081);
            assert_eq!(cfg.basic.loglevel, "debug");
            assert_eq!(
                cfg.http.cors_allowed_origins,
                vec!["http://a.example", "http://b.example"]
            );
            Ok(())
        });
    }

    #[test]
    fn env_names_map_to_nested_keys() {
        assert_eq!(dotted_key("DATABASE_URL"), Some("basic.database_url"));
        assert_eq!(dotted_key("jwt_secret_key"), Some("security.jwt_secret_key"));
        assert_eq!(dotted_key("PATH"), None);
    }
}
