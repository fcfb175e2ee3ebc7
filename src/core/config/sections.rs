use thiserror::Error;

use super::env;
use super::secret::load_or_create_secret_key;

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://localhost:8080"];

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    fn from_label(label: Option<&str>) -> Self {
        match label.map(str::to_ascii_lowercase).as_deref() {
            Some("production" | "prod") => Self::Production,
            Some("staging") => Self::Staging,
            Some("test" | "testing") => Self::Test,
            _ => Self::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl ServerSettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        let host = env::text("GRADEBOOK_HOST", "0.0.0.0");
        let port = env::number("GRADEBOOK_PORT", 8000u16)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue { field: "GRADEBOOK_PORT", value: "0".into() });
        }
        Ok(Self { host, port })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    /// Production always runs strict; other environments opt in.
    pub(crate) strict_config: bool,
}

impl RuntimeSettings {
    pub(super) fn from_env() -> Self {
        let label = env::optional("GRADEBOOK_ENV").or_else(|| env::optional("ENVIRONMENT"));
        let environment = Environment::from_label(label.as_deref());
        let strict_config =
            env::flag("GRADEBOOK_STRICT_CONFIG") || environment == Environment::Production;
        Self { environment, strict_config }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

impl ApiSettings {
    pub(super) fn from_env() -> Self {
        Self {
            project_name: env::text("PROJECT_NAME", "Gradebook API"),
            version: env::text("VERSION", env!("CARGO_PKG_VERSION")),
            api_v1_str: env::text("API_V1_STR", "/api/v1"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) access_token_expire_minutes: u64,
    pub(crate) algorithm: String,
}

impl SecuritySettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: env::optional("SECRET_KEY").unwrap_or_else(load_or_create_secret_key),
            // One week.
            access_token_expire_minutes: env::number("ACCESS_TOKEN_EXPIRE_MINUTES", 10_080)?,
            algorithm: env::text("ALGORITHM", "HS256"),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

impl CorsSettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        Ok(Self { origins: env::list("BACKEND_CORS_ORIGINS", DEFAULT_CORS_ORIGINS)? })
    }
}

/// Either an explicit `DATABASE_URL` or the `POSTGRES_*` parts it is assembled from.
#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) url: Option<String>,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) name: String,
    pub(crate) max_connections: u32,
    pub(crate) acquire_timeout_seconds: u64,
}

impl DatabaseSettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::optional("DATABASE_URL"),
            host: env::text("POSTGRES_SERVER", "localhost"),
            port: env::number("POSTGRES_PORT", 5432)?,
            user: env::text("POSTGRES_USER", "gradebook"),
            password: env::text("POSTGRES_PASSWORD", ""),
            name: env::text("POSTGRES_DB", "gradebook"),
            max_connections: env::number("DATABASE_MAX_CONNECTIONS", 20)?,
            acquire_timeout_seconds: env::number("DATABASE_ACQUIRE_TIMEOUT_SECONDS", 30)?,
        })
    }

    pub(crate) fn database_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }

    pub(super) fn has_credentials(&self) -> bool {
        self.url.is_some() || !self.password.is_empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RedisSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) db: u16,
    pub(crate) password: Option<String>,
}

impl RedisSettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::text("REDIS_HOST", "localhost"),
            port: env::number("REDIS_PORT", 6379)?,
            db: env::number("REDIS_DB", 0)?,
            password: env::optional("REDIS_PASSWORD"),
        })
    }

    pub(crate) fn redis_url(&self) -> String {
        let auth = self.password.as_ref().map(|password| format!(":{password}@")).unwrap_or_default();
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Fixed-window limits applied per username to signup and login.
#[derive(Debug, Clone)]
pub(crate) struct RateLimitSettings {
    pub(crate) auth_attempts: u64,
    pub(crate) window_seconds: u64,
}

impl RateLimitSettings {
    pub(super) fn from_env() -> Result<Self, ConfigError> {
        let limits = Self {
            auth_attempts: env::number("AUTH_RATE_LIMIT", 10)?,
            window_seconds: env::number("AUTH_RATE_WINDOW_SECONDS", 60)?,
        };
        if limits.auth_attempts == 0 || limits.window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "AUTH_RATE_LIMIT",
                value: format!("{} per {}s", limits.auth_attempts, limits.window_seconds),
            });
        }
        Ok(limits)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AdminSettings {
    pub(crate) first_superuser_username: String,
    pub(crate) first_superuser_password: String,
}

impl AdminSettings {
    pub(super) fn from_env() -> Self {
        Self {
            first_superuser_username: env::text("FIRST_SUPERUSER_USERNAME", "admin"),
            first_superuser_password: env::text("FIRST_SUPERUSER_PASSWORD", ""),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

impl TelemetrySettings {
    pub(super) fn from_env() -> Self {
        Self {
            log_level: env::text("GRADEBOOK_LOG_LEVEL", "info"),
            json: env::flag("GRADEBOOK_LOG_JSON"),
            prometheus_enabled: env::flag("PROMETHEUS_ENABLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(url: Option<&str>) -> DatabaseSettings {
        DatabaseSettings {
            url: url.map(str::to_string),
            host: "db".to_string(),
            port: 5432,
            user: "user".to_string(),
            password: "secret".to_string(),
            name: "gradebook".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 30,
        }
    }

    #[test]
    fn explicit_database_url_wins_over_parts() {
        assert_eq!(database(Some("postgresql://override/db")).database_url(), "postgresql://override/db");
        assert_eq!(database(None).database_url(), "postgresql://user:secret@db:5432/gradebook");
    }

    #[test]
    fn redis_url_carries_password_only_when_set() {
        let redis = RedisSettings { host: "cache".to_string(), port: 6379, db: 2, password: None };
        assert_eq!(redis.redis_url(), "redis://cache:6379/2");

        let redis = RedisSettings { password: Some("pw".to_string()), ..redis };
        assert_eq!(redis.redis_url(), "redis://:pw@cache:6379/2");
    }

    #[test]
    fn environment_labels() {
        assert_eq!(Environment::from_label(Some("PROD")), Environment::Production);
        assert_eq!(Environment::from_label(Some("staging")), Environment::Staging);
        assert_eq!(Environment::from_label(Some("testing")), Environment::Test);
        assert_eq!(Environment::from_label(Some("qa")), Environment::Development);
        assert_eq!(Environment::from_label(None), Environment::Development);
    }
}
