//! Service configuration loaded from TOML.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! dialect = "postgres"
//! pool_size = 16
//! query_timeout_ms = 5000
//!
//! [tokens]
//! access_days = 1
//! refresh_months = 1
//!
//! [pagination]
//! per_page = 10
//! min_per_page = 5
//!
//! [log]
//! filter = "accounts=info,querygen.sql=debug"
//! ```
//!
//! `${VAR}` references are expanded from the environment (after `.env` is
//! loaded) before validation.

use querygen::{Dialect, GeneratorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing env var for config expansion: {0}")]
    MissingEnv(String),

    #[error("invalid env var reference: {0}")]
    BadReference(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub tokens: TokenConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Per-statement timeout; `0` or absent disables it.
    #[serde(default)]
    pub query_timeout_ms: u64,
}

fn default_pool_size() -> usize {
    querygen::pool::DEFAULT_POOL_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Access token lifetime in days.
    #[serde(default = "default_one")]
    pub access_days: i64,
    /// Refresh token lifetime in 30-day months.
    #[serde(default = "default_one")]
    pub refresh_months: i64,
}

fn default_one() -> i64 {
    1
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_days: 1,
            refresh_months: 1,
        }
    }
}

impl TokenConfig {
    pub fn access_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.access_days)
    }

    pub fn refresh_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_months * 30)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub order_by: String,
    pub sort: String,
    pub per_page: i64,
    pub page: i64,
    pub min_per_page: i64,
    /// Columns callers may sort by. Sort columns are copied into SQL, so only
    /// these are accepted.
    pub order_columns: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            order_by: "id".to_string(),
            sort: "asc".to_string(),
            per_page: 10,
            page: 1,
            min_per_page: 5,
            order_columns: vec![
                "id".to_string(),
                "display_name".to_string(),
                "created_at".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "accounts=info,querygen.sql=debug".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, then read, expand and validate `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse, expand and validate a TOML document.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(raw)?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    fn expand_env(&mut self) -> Result<(), ConfigError> {
        self.database.url = expand_env_vars(&self.database.url)?;
        self.log.filter = expand_env_vars(&self.log.filter)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid("database.pool_size must be at least 1".into()));
        }
        if self.tokens.access_days < 1 || self.tokens.refresh_months < 1 {
            return Err(ConfigError::Invalid("token lifetimes must be at least 1".into()));
        }

        let p = &self.pagination;
        if p.min_per_page < 1 || p.per_page < p.min_per_page {
            return Err(ConfigError::Invalid(format!(
                "pagination.per_page ({}) must be >= min_per_page ({}) >= 1",
                p.per_page, p.min_per_page
            )));
        }
        if p.page < 1 {
            return Err(ConfigError::Invalid("pagination.page must be at least 1".into()));
        }
        if !p.order_columns.contains(&p.order_by) {
            return Err(ConfigError::Invalid(format!(
                "pagination.order_by `{}` is not one of order_columns",
                p.order_by
            )));
        }
        if p.sort.parse::<querygen::Order>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "pagination.sort must be asc or desc, got `{}`",
                p.sort
            )));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.database.query_timeout_ms > 0)
            .then(|| Duration::from_millis(self.database.query_timeout_ms))
    }

    /// Generator settings for every statement the service builds.
    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new()
            .dialect(self.database.dialect)
            .with_tracing();
        if let Some(timeout) = self.query_timeout() {
            config = config.query_timeout(timeout);
        }
        config
    }
}

fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(ConfigError::BadReference(format!("${{{key}")));
            }
            if key.is_empty() {
                return Err(ConfigError::BadReference("${}".to_string()));
            }

            let v = std::env::var(&key).map_err(|_| ConfigError::MissingEnv(key.clone()))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
