use std::env;

use crate::error::{AppError, Result};
use crate::fetcher::BANK_OF_ALGERIA_URL;

pub const DEFAULT_PORT: u16 = 3002;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub rates_url: String,
    pub static_dir: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: "sqlite://database.db".to_string(),
            rates_url: BANK_OF_ALGERIA_URL.to_string(),
            static_dir: "public".to_string(),
        }
    }

    /// Defaults overridden by `HOST`, `PORT`, `DATABASE_URL`, `RATES_URL` and
    /// `STATIC_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(host) = lookup("HOST") {
            config = config.with_host(&host);
        }
        if let Some(port) = lookup("PORT") {
            let port = port
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid PORT {:?}: {}", port, e)))?;
            config = config.with_port(port);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config = config.with_database_url(&url);
        }
        if let Some(url) = lookup("RATES_URL") {
            config = config.with_rates_url(&url);
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config = config.with_static_dir(&dir);
        }

        Ok(config)
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database_url(mut self, url: &str) -> Self {
        self.database_url = url.to_string();
        self
    }

    pub fn with_rates_url(mut self, url: &str) -> Self {
        self.rates_url = url.to_string();
        self
    }

    pub fn with_static_dir(mut self, dir: &str) -> Self {
        self.static_dir = dir.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
