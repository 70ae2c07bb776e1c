//! Server configuration.
//!
//! Defaults, overridden by environment variables (a `.env` file is loaded
//! first if present), overridden in turn by CLI flags:
//!
//! | Variable                | Default   |
//! |-------------------------|-----------|
//! | `SENT_HOST`             | `0.0.0.0` |
//! | `SENT_PORT`             | `3000`    |
//! | `SENT_MAX_UPLOAD_BYTES` | 10 MiB    |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::error::ConfigError;

pub const HOST_VAR: &str = "SENT_HOST";
pub const PORT_VAR: &str = "SENT_PORT";
pub const MAX_UPLOAD_BYTES_VAR: &str = "SENT_MAX_UPLOAD_BYTES";

pub const DEFAULT_PORT: u16 = 3000;

/// Upload size limit. A decade of ticks is well under a megabyte.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment, reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: read(&lookup, HOST_VAR)?.unwrap_or(defaults.host),
            port: read(&lookup, PORT_VAR)?.unwrap_or(defaults.port),
            max_upload_bytes: read(&lookup, MAX_UPLOAD_BYTES_VAR)?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }

    pub fn with_host(mut self, host: Option<IpAddr>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn read<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}
