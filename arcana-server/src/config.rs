use std::{env, fs};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Process configuration. Loaded from `$ARCANA_CONFIG_PATH` (TOML) when set,
/// defaults otherwise; `ARCANA_DATABASE_URL` and `ARCANA_BIND_ADDR` override
/// either source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    /// Ring-buffer capacity of the scan event channels; slow subscribers
    /// lag rather than block producers.
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7474".to_string(),
            database_url: "sqlite://arcana.db".to_string(),
            event_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let mut config = if let Ok(path) = env::var("ARCANA_CONFIG_PATH")
            && !path.trim().is_empty()
        {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&text)
                .with_context(|| format!("parsing config file {path}"))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("ARCANA_DATABASE_URL")
            && !url.trim().is_empty()
        {
            self.database_url = url;
        }
        if let Ok(addr) = env::var("ARCANA_BIND_ADDR")
            && !addr.trim().is_empty()
        {
            self.bind_addr = addr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ServerConfig =
            toml::from_str("bind_addr = \"0.0.0.0:9000\"").expect("parse");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.database_url, "sqlite://arcana.db");
        assert_eq!(config.event_capacity, 256);
    }
}
