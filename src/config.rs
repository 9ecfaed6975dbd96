use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const DEFAULT_BIND: &str = "127.0.0.1:4020";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Server settings read from the process environment.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub reconcile_on_start: bool,
    pub log_json: bool,
    pub require_dev_header: bool,
}

impl NetworkConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests can avoid touching the real environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL is required"))?;

        let bind = lookup("NETWORK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid NETWORK_BIND '{}'", bind))?;

        let max_connections = match lookup("NETWORK_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid NETWORK_MAX_CONNECTIONS '{}'", raw))?
                .max(1),
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let acquire_timeout_secs = match lookup("NETWORK_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid NETWORK_ACQUIRE_TIMEOUT_SECS '{}'", raw))?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            reconcile_on_start: flag(lookup("NETWORK_RECONCILE_ON_START")),
            log_json: flag(lookup("NETWORK_LOG_JSON")),
            require_dev_header: flag(lookup("NETWORK_REQUIRE_DEV_HEADER")),
        })
    }

    pub async fn connect_pool(&self) -> anyhow::Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.database_url)
            .await
            .context("failed to connect to postgres")
    }
}

fn flag(value: Option<String>) -> bool {
    match value {
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes"
        }
        None => false,
    }
}
