/**
 * Server Configuration
 *
 * Environment-driven settings of the reference task server.
 *
 * # Configuration Sources
 *
 * - `SERVER_PORT` - listening port (default 3001, the port the sync client
 *   expects by default)
 * - `SERVER_HOST` - bind address (default `0.0.0.0`)
 *
 * Unparseable values fall back to the defaults with a warning; a bad value
 * never prevents startup.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `SERVER_HOST` and `SERVER_PORT`
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("SERVER_HOST").ok().as_deref(),
            std::env::var("SERVER_PORT").ok().as_deref(),
        )
    }

    fn from_values(host: Option<&str>, port: Option<&str>) -> Self {
        let defaults = Self::default();

        let host = match host.map(str::parse::<IpAddr>) {
            Some(Ok(host)) => host,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid SERVER_HOST: {}", e);
                defaults.host
            }
            None => defaults.host,
        };
        let port = match port.map(str::parse::<u16>) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid SERVER_PORT: {}", e);
                defaults.port
            }
            None => defaults.port,
        };

        Self { host, port }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
