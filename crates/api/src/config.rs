use anyhow::{bail, Context};
use std::net::SocketAddr;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Process settings, read from `TIMETABLE__SECTION__KEY` variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
            log_format: LogFormat::Json,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = lookup("TIMETABLE__SERVER__PORT") {
            cfg.port = v
                .trim()
                .parse()
                .with_context(|| format!("TIMETABLE__SERVER__PORT={v:?} is not a port number"))?;
        }
        if let Some(v) = lookup("TIMETABLE__SERVER__BODY_LIMIT") {
            cfg.body_limit = v
                .trim()
                .parse()
                .with_context(|| format!("TIMETABLE__SERVER__BODY_LIMIT={v:?} is not a byte count"))?;
        }
        if let Some(v) = lookup("TIMETABLE__LOG__FORMAT") {
            cfg.log_format = match v.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                other => bail!("TIMETABLE__LOG__FORMAT={other:?}, expected json or text"),
            };
        }
        Ok(cfg)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
