use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Enables the read-through user cache when set.
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,
    /// Mail service endpoint. Verification links are only logged when unset.
    pub mail_service_url: Option<String>,
    /// Base URL embedded in verification links.
    pub public_base_url: String,
    pub session_ttl: Duration,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let cors_allowed_origins =
            allowed_origins(optional_var("CORS_ALLOWED_ORIGINS").as_deref(), &public_base_url)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Internal("DATABASE_URL must be set".into()))?,
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            redis_url: optional_var("REDIS_URL"),
            cache_ttl: Duration::from_secs(parse_var("CACHE_TTL_SECS", 60)?),
            mail_service_url: optional_var("MAIL_SERVICE_URL"),
            public_base_url,
            session_ttl: session_ttl(parse_var("SESSION_TTL_HOURS", 24)?)?,
            cors_allowed_origins,
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 5)?),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Session lifetime in hours, bounded so it also fits a cookie `Max-Age`.
fn session_ttl(hours: u64) -> Result<Duration, AppError> {
    hours
        .checked_mul(3600)
        .filter(|secs| *secs > 0 && i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| AppError::Internal("SESSION_TTL_HOURS out of range".into()))
}

/// Comma-separated list of exact origins; defaults to the origin of `public_base_url`.
/// Wildcards are refused since the session cookie rides on these requests.
fn allowed_origins(raw: Option<&str>, public_base_url: &str) -> Result<Vec<String>, AppError> {
    let origins: Vec<String> = match raw {
        Some(list) => list
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect(),
        None => vec![public_base_url.trim_end_matches('/').to_string()],
    };

    for origin in &origins {
        let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
        if !scheme_ok || origin.contains('*') {
            return Err(AppError::Internal(format!(
                "CORS_ALLOWED_ORIGINS contains an invalid origin: {}",
                origin
            )));
        }
    }
    Ok(origins)
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://test");
        for name in [
            "SERVER_PORT",
            "SERVER_HOST",
            "REDIS_URL",
            "SESSION_TTL_HOURS",
            "MAIL_SERVICE_URL",
            "PUBLIC_BASE_URL",
            "CORS_ALLOWED_ORIGINS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert!(config.redis_url.is_none());
        assert!(config.mail_service_url.is_none());
        assert_eq!(config.session_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:8080".to_string()]);

        // Custom values
        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("REDIS_URL", "redis://localhost:6379");
        env::set_var("SESSION_TTL_HOURS", "2");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.session_ttl, Duration::from_secs(2 * 3600));
        assert_eq!(config.server_url(), "http://0.0.0.0:3000");

        // Unparsable numbers are reported by name
        env::set_var("SERVER_PORT", "eighty");
        match Config::from_env() {
            Err(AppError::Internal(msg)) => assert!(msg.contains("SERVER_PORT")),
            Err(e) => panic!("Unexpected error: {:?}", e),
            Ok(_) => panic!("Config should reject a non-numeric port"),
        }

        for name in ["SERVER_PORT", "SERVER_HOST", "REDIS_URL", "SESSION_TTL_HOURS"] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(session_ttl(24).unwrap(), Duration::from_secs(24 * 3600));
        assert_eq!(
            session_ttl(u64::MAX),
            Err(AppError::Internal("SESSION_TTL_HOURS out of range".into()))
        );
        assert_eq!(
            session_ttl(u64::MAX / 3600),
            Err(AppError::Internal("SESSION_TTL_HOURS out of range".into()))
        );
        assert!(session_ttl(0).is_err());
    }

    #[test]
    fn test_allowed_origins() {
        assert_eq!(
            allowed_origins(None, "https://tracker.example.com/").unwrap(),
            vec!["https://tracker.example.com".to_string()]
        );
        assert_eq!(
            allowed_origins(
                Some("https://a.example.com, https://b.example.com/,"),
                "http://localhost:8080"
            )
            .unwrap(),
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string()
            ]
        );
        assert!(allowed_origins(Some("*"), "http://localhost:8080").is_err());
        assert!(allowed_origins(Some("https://*.example.com"), "http://localhost:8080").is_err());
        assert!(allowed_origins(Some("evil.example"), "http://localhost:8080").is_err());
    }
}
