use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Process configuration read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub model: String,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("RELAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .parse()
            .with_context(|| format!("RELAY_HOST is not an IP address: {host}"))?;

        let port = match lookup("RELAY_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("RELAY_PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = lookup("OPENAI_API_BASE").filter(|b| !b.trim().is_empty());

        let api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        match &api_key {
            Some(_) => info!("OpenAI API key loaded"),
            None => warn!("OPENAI_API_KEY not set; chat requests will fail until it is configured"),
        }

        Ok(Self {
            addr: SocketAddr::new(host, port),
            model,
            api_base,
            api_key,
        })
    }
}
