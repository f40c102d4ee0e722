//! Engine and server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::fleet::FleetPolicy;
use crate::tickets::FareConfig;

/// Tunables for the transit engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Edge weight used when a stop has no positive distance from the previous one.
    pub default_edge_weight: f64,

    /// Journey speed when no bus is chosen or the bus has no speed (kph).
    pub default_speed_kph: f64,

    /// Remaining distance at which a journey counts as approaching its destination.
    pub approach_threshold: f64,

    pub fares: FareConfig,

    pub fleet: FleetPolicy,

    /// Number of entries returned by the history listing.
    pub history_listing: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_edge_weight: 1.0,
            default_speed_kph: 30.0,
            approach_threshold: 0.2,
            fares: FareConfig::default(),
            fleet: FleetPolicy::default(),
            history_listing: 10,
        }
    }
}

/// Where the server keeps its data and listens.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

/// Errors reading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TRANSIT_BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl ServerConfig {
    pub const DEFAULT_DATA_DIR: &'static str = "data";
    pub const DEFAULT_BIND_ADDR: &'static str = "127.0.0.1:3000";

    /// Read `TRANSIT_DATA_DIR` and `TRANSIT_BIND_ADDR`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("TRANSIT_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string());
        let bind = lookup("TRANSIT_BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .trim()
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind.clone(),
                source,
            })?;
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            bind_addr,
        })
    }
}
