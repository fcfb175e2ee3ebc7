use super::sections::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, RateLimitSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerSettings, TelemetrySettings,
};

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    server: ServerSettings,
    runtime: RuntimeSettings,
    api: ApiSettings,
    security: SecuritySettings,
    cors: CorsSettings,
    database: DatabaseSettings,
    redis: RedisSettings,
    rate_limit: RateLimitSettings,
    admin: AdminSettings,
    telemetry: TelemetrySettings,
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            runtime: RuntimeSettings::from_env(),
            api: ApiSettings::from_env(),
            security: SecuritySettings::from_env()?,
            cors: CorsSettings::from_env()?,
            database: DatabaseSettings::from_env()?,
            redis: RedisSettings::from_env()?,
            rate_limit: RateLimitSettings::from_env()?,
            admin: AdminSettings::from_env(),
            telemetry: TelemetrySettings::from_env(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn rate_limit(&self) -> &RateLimitSettings {
        &self.rate_limit
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    /// Cross-section checks; secrets are only required when running strict.
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, value: &dyn ToString| ConfigError::InvalidValue {
            field,
            value: value.to_string(),
        };

        if !self.api.api_v1_str.starts_with('/') {
            return Err(invalid("API_V1_STR", &self.api.api_v1_str));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", &0));
        }
        if self.security.access_token_expire_minutes == 0 {
            return Err(invalid("ACCESS_TOKEN_EXPIRE_MINUTES", &0));
        }

        if self.runtime.strict_config {
            if !self.database.has_credentials() {
                return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
            }
            if self.admin.first_superuser_password.is_empty() {
                return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
            }
        }

        Ok(())
    }
}
