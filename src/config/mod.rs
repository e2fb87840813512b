//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The coordinator's node list is always an explicit [`CoordinatorConfig`]
//! value handed to its constructor.

pub mod cli;
pub mod cli_convert;
pub mod toml;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default port a worker node listens on
pub const DEFAULT_NODE_PORT: u16 = 12345;

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Worker node addresses, in partition assignment order
    #[serde(default)]
    pub nodes: Vec<NodeAddress>,
    /// Timeout for establishing a connection to a node (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Timeout for one request/response exchange (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Extra dispatch attempts per partition after the first failure
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_retries() -> u32 {
    1
}

impl CoordinatorConfig {
    pub fn new(nodes: Vec<NodeAddress>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            retries: default_retries(),
        }
    }
}

/// Worker node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Port to listen on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Maximum number of connections served concurrently
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Segments per local sort (defaults to hardware concurrency)
    #[serde(default)]
    pub parallelism: Option<usize>,
}

fn default_listen_port() -> u16 {
    DEFAULT_NODE_PORT
}

fn default_max_connections() -> usize {
    64
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            max_connections: default_max_connections(),
            parallelism: None,
        }
    }
}

/// Worker node address (host, port)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host:port`, or a bare `host` using `default_port`
    pub fn parse_with_default(s: &str, default_port: u16) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("Empty node address");
        }
        match s.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    anyhow::bail!("Missing host in node address: {}", s);
                }
                let port: u16 = port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid port in node address: {}", s))?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(s, default_port)),
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, DEFAULT_NODE_PORT)
    }
}

impl TryFrom<String> for NodeAddress {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeAddress> for String {
    fn from(addr: NodeAddress) -> Self {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let addr: NodeAddress = "10.0.1.10:9000".parse().unwrap();
        assert_eq!(addr, NodeAddress::new("10.0.1.10", 9000));
        assert_eq!(addr.to_string(), "10.0.1.10:9000");
    }

    #[test]
    fn test_parse_bare_host_uses_default_port() {
        let addr = NodeAddress::parse_with_default("node-a", 7000).unwrap();
        assert_eq!(addr, NodeAddress::new("node-a", 7000));

        let addr: NodeAddress = "node-b".parse().unwrap();
        assert_eq!(addr.port, DEFAULT_NODE_PORT);
    }

    #[test]
    fn test_parse_rejects_bad_addresses() {
        assert!("".parse::<NodeAddress>().is_err());
        assert!("host:notaport".parse::<NodeAddress>().is_err());
        assert!(":9000".parse::<NodeAddress>().is_err());
        assert!("host:70000".parse::<NodeAddress>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.coordinator.nodes.is_empty());
        assert_eq!(config.coordinator.retries, 1);
        assert_eq!(config.coordinator.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.coordinator.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.node.listen_port, DEFAULT_NODE_PORT);
        assert_eq!(config.node.max_connections, 64);
        assert_eq!(config.node.parallelism, None);
    }
}
