/// Configuration management for Post Service
///
/// Loaded from environment variables (after `.env`, if present). Unset variables
/// take defaults; a variable that is set but unparsable aborts startup.
use crate::cache::{InvalidationScope, TtlPolicy};
use crate::models::CityDirectory;
use crate::ratelimit::RateLimitPolicy;
use crate::services::ServiceSettings;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub log_format: LogFormat,
    pub cities: CityDirectory,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Cache (Redis) configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    pub op_timeout: Duration,
    pub invalidation_scope: InvalidationScope,
    pub popular_cities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "console" => Ok(LogFormat::Text),
            other => Err(format!(
                "unknown log format '{}' (expected json or text)",
                other
            )),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let cities = match lookup("CITY_DIRECTORY") {
            Some(raw) => CityDirectory::parse(&raw).map_err(|e| format!("CITY_DIRECTORY: {}", e))?,
            None => CityDirectory::default(),
        };

        let popular_cities = match lookup("POPULAR_CITIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
            None => crate::cache::policy::DEFAULT_POPULAR_CITIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        };

        let config = Config {
            app: AppConfig {
                env: text("APP_ENV", "development"),
                host: text("POST_SERVICE_HOST", "0.0.0.0"),
                port: parse_var(&lookup, "POST_SERVICE_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: text("DATABASE_URL", "postgres://localhost/posts"),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_var(&lookup, "DATABASE_RUN_MIGRATIONS", true)?,
            },
            cache: CacheConfig {
                url: text("REDIS_URL", "redis://localhost:6379"),
                op_timeout: Duration::from_millis(parse_var(&lookup, "REDIS_OP_TIMEOUT_MS", 500)?),
                invalidation_scope: parse_var(
                    &lookup,
                    "CACHE_INVALIDATION_SCOPE",
                    InvalidationScope::City,
                )?,
                popular_cities,
            },
            rate_limit: RateLimitConfig {
                limit: parse_var(&lookup, "POST_RATE_LIMIT", 3)?,
                window: Duration::from_secs(parse_var(&lookup, "POST_RATE_WINDOW_SECS", 3600)?),
            },
            log_format: parse_var(&lookup, "LOG_FORMAT", LogFormat::Text)?,
            cities,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.app.port == 0 {
            return Err("POST_SERVICE_PORT must be greater than 0".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }
        if self.cache.op_timeout.is_zero() {
            return Err("REDIS_OP_TIMEOUT_MS must be greater than 0".to_string());
        }
        if self.rate_limit.limit == 0 {
            return Err("POST_RATE_LIMIT must be greater than 0".to_string());
        }
        if self.rate_limit.window.is_zero() {
            return Err("POST_RATE_WINDOW_SECS must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }

    /// Orchestrator tunables derived from this configuration
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            rate_limit: RateLimitPolicy {
                limit: self.rate_limit.limit,
                window: self.rate_limit.window,
            },
            ttl: TtlPolicy::with_popular_cities(self.cache.popular_cities.iter().cloned()),
            invalidation: self.cache.invalidation_scope,
            cities: self.cities.clone(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{} has invalid value '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}
