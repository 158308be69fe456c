use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::identity::token::MAX_TOKEN_TTL_HOURS;
use crate::workflows::jobs::FinalizeMode;

/// Secret shipped for local development; refused when running in production.
pub const DEFAULT_JWT_SECRET: &str = "secret_key_change_me";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub lifecycle: LifecycleConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        if jwt_secret.is_empty()
            || (environment == AppEnvironment::Production && jwt_secret == DEFAULT_JWT_SECRET)
        {
            return Err(ConfigError::InsecureJwtSecret);
        }

        let token_ttl_hours = env::var("APP_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()
            .ok()
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .ok_or(ConfigError::InvalidTokenTtl)?;

        let bcrypt_cost = env::var("APP_BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .ok()
            .filter(|cost| (4..=31).contains(cost))
            .ok_or(ConfigError::InvalidBcryptCost)?;

        let finalize_mode = match env::var("APP_FINALIZE_MODE") {
            Ok(raw) => FinalizeMode::parse(&raw).ok_or(ConfigError::InvalidFinalizeMode)?,
            Err(_) => FinalizeMode::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                bcrypt_cost,
            },
            lifecycle: LifecycleConfig { finalize_mode },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credential hashing and bearer token settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Knobs for the job/application state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleConfig {
    pub finalize_mode: FinalizeMode,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InsecureJwtSecret,
    InvalidTokenTtl,
    InvalidBcryptCost,
    InvalidFinalizeMode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InsecureJwtSecret => write!(
                f,
                "JWT_SECRET must be set to a non-default value outside development"
            ),
            ConfigError::InvalidTokenTtl => {
                write!(
                    f,
                    "APP_TOKEN_TTL_HOURS must be an integer between 1 and {MAX_TOKEN_TTL_HOURS}"
                )
            }
            ConfigError::InvalidBcryptCost => {
                write!(f, "APP_BCRYPT_COST must be an integer between 4 and 31")
            }
            ConfigError::InvalidFinalizeMode => {
                write!(f, "APP_FINALIZE_MODE must be 'lenient' or 'strict'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "JWT_SECRET",
            "APP_TOKEN_TTL_HOURS",
            "APP_BCRYPT_COST",
            "APP_FINALIZE_MODE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.lifecycle.finalize_mode, FinalizeMode::Lenient);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
        reset_env();
    }

    #[test]
    fn production_rejects_default_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InsecureJwtSecret)
        ));

        env::set_var("JWT_SECRET", "a-real-secret");
        let config = AppConfig::load().expect("explicit secret accepted");
        assert_eq!(config.environment, AppEnvironment::Production);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_BCRYPT_COST", "2");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidBcryptCost)
        ));

        reset_env();
        env::set_var("APP_TOKEN_TTL_HOURS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTokenTtl)));

        for hours in ["8761", "9223372036854775807"] {
            reset_env();
            env::set_var("APP_TOKEN_TTL_HOURS", hours);
            assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTokenTtl)));
        }

        reset_env();
        env::set_var("APP_FINALIZE_MODE", "eventually");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFinalizeMode)
        ));
        reset_env();
    }

    #[test]
    fn strict_finalize_mode_is_configurable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_FINALIZE_MODE", "Strict");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.lifecycle.finalize_mode, FinalizeMode::Strict);
        reset_env();
    }
}
