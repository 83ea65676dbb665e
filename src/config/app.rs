use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

use crate::services::OwnershipPolicy;

const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-in-production";

/// One year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub ownership: OwnershipPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Unset keys take
    /// their defaults; set keys that fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", 72)?;
        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let ownership = parse_or(&lookup, "WORKOUT_OWNERSHIP", OwnershipPolicy::Owner)?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if environment == "development" || environment == "test" => {
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            _ => bail!("JWT_SECRET must be set when ENVIRONMENT is '{environment}'"),
        };

        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            bail!(
                "TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {token_ttl_hours}"
            );
        }

        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}");
        }

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
            ownership,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}
