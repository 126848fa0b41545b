// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;

/// Raised when an environment variable is present but unusable.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Reject submissions whose declared score disagrees with their answers.
    pub strict_score_check: bool,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
}

/// Connection, pool sizing and bootstrap settings for PostgreSQL.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Takes precedence over the individual host/user/... fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub init_retries: u32,
    pub init_retry_delay: Duration,
}

/// Outbound mail relay settings.
///
/// Every field is optional at load time: an incomplete relay configuration
/// disables notifications instead of failing startup.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Implicit TLS (usually port 465) when true, STARTTLS otherwise.
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from_name: String,
    pub from_email: Option<String>,
    pub bcc_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            host: var("DB_HOST").unwrap_or_else(|| "db".to_string()),
            port: parse_or(&var, "DB_PORT", 5432)?,
            user: var("DB_USER").unwrap_or_else(|| "apiresultsuser".to_string()),
            password: var("DB_PASSWORD").unwrap_or_else(|| "apiresultspwd".to_string()),
            name: var("DB_NAME").unwrap_or_else(|| "quiz_results".to_string()),
            max_connections: parse_or(&var, "DB_POOL_SIZE", 10)?,
            acquire_timeout: Duration::from_secs(parse_or(&var, "DB_ACQUIRE_TIMEOUT_SECS", 30)?),
            init_retries: parse_or(&var, "DB_INIT_RETRIES", 5)?,
            init_retry_delay: Duration::from_millis(parse_or(&var, "DB_INIT_RETRY_DELAY_MS", 5000)?),
        };

        let mail = MailConfig {
            enabled: var("SMTP_ENABLED").as_deref() == Some("true"),
            host: var("SMTP_HOST"),
            // An unparseable port is reported later as a missing relay setting.
            port: var("SMTP_PORT").and_then(|p| p.trim().parse().ok()),
            secure: var("SMTP_SECURE").as_deref() == Some("true"),
            user: var("SMTP_USER"),
            password: var("SMTP_PASS"),
            from_name: var("SMTP_FROM_NAME").unwrap_or_else(|| "Quiz Results".to_string()),
            from_email: var("SMTP_FROM_EMAIL"),
            bcc_email: var("SMTP_BCC_EMAIL"),
        };

        Ok(Self {
            port: parse_or(&var, "PORT", 3030)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            strict_score_check: var("STRICT_SCORE_CHECK").as_deref() == Some("true"),
            database,
            mail,
        })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.url {
            Some(url) => url.parse(),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name)),
        }
    }
}

impl MailConfig {
    /// Names of the relay settings that are required but absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.is_none() {
            missing.push("SMTP_HOST");
        }
        if self.port.is_none() {
            missing.push("SMTP_PORT");
        }
        if self.user.is_none() {
            missing.push("SMTP_USER");
        }
        if self.password.is_none() {
            missing.push("SMTP_PASS");
        }
        if self.from_email.is_none() {
            missing.push("SMTP_FROM_EMAIL");
        }
        missing
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError { name, value: raw }),
        None => Ok(default),
    }
}
