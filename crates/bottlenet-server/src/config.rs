use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Process configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Upper bound on every single store operation.
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("BOTTLENET_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("BOTTLENET_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("BOTTLENET_PORT must be a port number")?;
        let db_path: PathBuf = lookup("BOTTLENET_DB_PATH")
            .unwrap_or_else(|| "bottlenet.db".into())
            .into();
        let timeout_secs: u64 = lookup("BOTTLENET_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .context("BOTTLENET_STORE_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            host,
            port,
            db_path,
            store_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
