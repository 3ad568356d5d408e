use std::env;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    /// When unset, notification intents are only logged.
    pub redis_url: Option<String>,
    pub notification_queue: String,
    pub port: u16,
}

pub const DEFAULT_NOTIFICATION_QUEUE: &str = "placement:notifications";

impl AppConfig {
    /// Read configuration from environment variables (call `dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            notification_queue: env::var("NOTIFICATION_QUEUE")
                .unwrap_or_else(|_| DEFAULT_NOTIFICATION_QUEUE.to_string()),
            port: parsed("PORT", 8080)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
