//! Configuration loading and representation.
//!
//! Values come from the process environment. `main` may seed the environment
//! from a `.env` file first; this module never touches the filesystem.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which record store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local maps; data is lost on restart.
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            store: StoreBackend::InMemory,
        }
    }
}

impl AppConfig {
    /// Read `HOST`, `PORT`, `DATABASE_URL` and `DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "HOST",
                expected: "an IP address",
                value: v,
            })?,
            None => defaults.host,
        };

        let port = match get("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                expected: "a TCP port (0-65535)",
                value: v,
            })?,
            None => defaults.port,
        };

        let store = match get("DATABASE_URL") {
            Some(database_url) => {
                let max_connections = match get("DB_MAX_CONNECTIONS") {
                    Some(v) => match v.trim().parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            return Err(ConfigError::Invalid {
                                var: "DB_MAX_CONNECTIONS",
                                expected: "a positive integer",
                                value: v,
                            });
                        }
                    },
                    None => DEFAULT_DB_MAX_CONNECTIONS,
                };
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            None => StoreBackend::InMemory,
        };

        Ok(Self { host, port, store })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
