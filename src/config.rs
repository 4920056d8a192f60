use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    /// Required when `storage_backend` is MySQL
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    /// Employee ids the in-memory roster knows about
    pub seed_employee_ids: Vec<u64>,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub roster_cache_ttl_secs: u64,
    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}"))
}

fn parse_ids(raw: &str) -> anyhow::Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .with_context(|| format!("SEED_EMPLOYEE_IDS contains invalid id {s:?}"))
        })
        .collect()
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        let storage_backend: StorageBackend = parse_var("STORAGE_BACKEND", "mysql")?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Mysql && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set for the mysql backend"));
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            database_url,
            storage_backend,
            seed_employee_ids: parse_ids(&var_or("SEED_EMPLOYEE_IDS", ""))?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,
            roster_cache_ttl_secs: parse_var("ROSTER_CACHE_TTL_SECS", "300")?,
            api_prefix: var_or("API_PREFIX", "/api"),
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_var("LOG_LEVEL", "debug")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_sensitively() {
        assert_eq!("mysql".parse::<StorageBackend>().unwrap(), StorageBackend::Mysql);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
    }

    #[test]
    fn seed_ids_tolerate_spaces_and_trailing_commas() {
        assert_eq!(parse_ids("100, 200,300,").unwrap(), vec![100, 200, 300]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(parse_ids("100,abc").is_err());
    }
}
