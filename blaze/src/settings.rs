//! Environment-driven settings

use std::fmt::Display;
use std::str::FromStr;

use secrecy::SecretString;

use crate::errors::BlazeError;
use crate::logs::LogLevel;
use crate::reconcile::matcher::{LabelScope, DEFAULT_LABEL_PREFIX};

/// Service settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Log level
    pub log_level: LogLevel,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Webhook shared secret
    pub secret: SecretString,

    /// Portainer connection
    pub portainer: PortainerSettings,

    /// Opt-in label prefix
    pub label_prefix: String,

    /// Where opt-in labels are looked up
    pub label_scope: LabelScope,

    /// Max concurrent stack file fetches
    pub fetch_concurrency: usize,
}

/// Portainer connection settings
#[derive(Debug, Clone)]
pub struct PortainerSettings {
    pub url: String,
    pub token: SecretString,

    /// Skip TLS certificate validation
    pub insecure: bool,

    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, BlazeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BlazeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = required(&lookup, "SECRET")?;
        let url = required(&lookup, "PORTAINER_URL")?;
        let token = required(&lookup, "PORTAINER_TOKEN")?;

        let parsed = url::Url::parse(&url)
            .map_err(|e| BlazeError::ConfigError(format!("Invalid PORTAINER_URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BlazeError::ConfigError(format!(
                "Invalid PORTAINER_URL {}: unsupported scheme {}",
                url,
                parsed.scheme()
            )));
        }

        let fetch_concurrency: usize = parse_or(&lookup, "BLAZE_FETCH_CONCURRENCY", 4)?;
        if fetch_concurrency == 0 {
            return Err(BlazeError::ConfigError(
                "BLAZE_FETCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            log_level: parse_or(&lookup, "LOG_LEVEL", LogLevel::Info)?,
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 80)?,
            secret: SecretString::from(secret),
            portainer: PortainerSettings {
                url,
                token: SecretString::from(token),
                insecure: match lookup("PORTAINER_INSECURE") {
                    Some(value) => parse_flag("PORTAINER_INSECURE", &value)?,
                    None => false,
                },
                timeout_secs: parse_or(&lookup, "PORTAINER_TIMEOUT_SECS", 30)?,
            },
            label_prefix: lookup("BLAZE_LABEL_PREFIX")
                .unwrap_or_else(|| DEFAULT_LABEL_PREFIX.to_string()),
            label_scope: parse_or(&lookup, "BLAZE_LABEL_SCOPE", LabelScope::Both)?,
            fetch_concurrency,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, BlazeError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| BlazeError::ConfigError(format!("{} not set", key)))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, BlazeError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| BlazeError::ConfigError(format!("Invalid {} {:?}: {}", key, value, e))),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, BlazeError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BlazeError::ConfigError(format!(
            "Invalid {} {:?}: expected a boolean",
            key, value
        ))),
    }
}
