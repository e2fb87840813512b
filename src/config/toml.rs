//! TOML configuration file parsing
//!
//! ```toml
//! [coordinator]
//! nodes = ["10.0.1.10:12345", "10.0.1.11:12345"]
//! request_timeout_ms = 30000
//!
//! [node]
//! listen_port = 12345
//! max_connections = 32
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{parse_duration_ms, parse_host_list, read_clients_file, resolve_listen_port};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Node list
    if let Some(ref host_list) = cli.host_list {
        config.coordinator.nodes = parse_host_list(host_list, cli.worker_port)
            .context("Invalid --host-list")?;
    } else if let Some(ref clients_file) = cli.clients_file {
        config.coordinator.nodes = read_clients_file(clients_file, cli.worker_port)?;
    }

    // Dispatch policy
    if let Some(ref timeout) = cli.connect_timeout {
        config.coordinator.connect_timeout_ms = parse_duration_ms(timeout)
            .context("Invalid --connect-timeout")?;
    }
    if let Some(ref timeout) = cli.request_timeout {
        config.coordinator.request_timeout_ms = parse_duration_ms(timeout)
            .context("Invalid --request-timeout")?;
    }
    if let Some(retries) = cli.retries {
        config.coordinator.retries = retries;
    }

    // Node service
    if cli.listen_port.is_some() {
        let (port, fell_back) = resolve_listen_port(cli.listen_port.as_deref());
        if fell_back {
            tracing::warn!(
                "Invalid listen port {:?}, using default port {}",
                cli.listen_port.as_deref().unwrap_or_default(),
                port
            );
        }
        config.node.listen_port = port;
    }
    if let Some(max_connections) = cli.max_connections {
        config.node.max_connections = max_connections;
    }
    if let Some(parallelism) = cli.parallelism {
        config.node.parallelism = Some(parallelism);
    }

    Ok(config)
}

/// Load the configuration for a CLI invocation
///
/// Starts from the TOML file when `--config` is given (defaults otherwise),
/// then applies CLI overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("distsort").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [coordinator]
            nodes = ["10.0.1.10:12345", "10.0.1.11:12346"]
            connect_timeout_ms = 1000
            request_timeout_ms = 30000
            retries = 0

            [node]
            listen_port = 9000
            max_connections = 8
            parallelism = 4
        "#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.coordinator.nodes, vec![
            NodeAddress::new("10.0.1.10", 12345),
            NodeAddress::new("10.0.1.11", 12346),
        ]);
        assert_eq!(config.coordinator.connect_timeout_ms, 1000);
        assert_eq!(config.coordinator.request_timeout_ms, 30000);
        assert_eq!(config.coordinator.retries, 0);
        assert_eq!(config.node.listen_port, 9000);
        assert_eq!(config.node.max_connections, 8);
        assert_eq!(config.node.parallelism, Some(4));
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_toml_string("[coordinator]\nnodes = [\"node-a\"]\n").unwrap();
        assert_eq!(config.coordinator.nodes, vec![NodeAddress::new("node-a", DEFAULT_NODE_PORT)]);
        assert_eq!(config.coordinator.retries, 1);
        assert_eq!(config.node.listen_port, DEFAULT_NODE_PORT);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_toml_string("").unwrap();
        assert!(config.coordinator.nodes.is_empty());
    }

    #[test]
    fn test_parse_invalid_node_address() {
        assert!(parse_toml_string("[coordinator]\nnodes = [\"host:bad\"]\n").is_err());
    }

    #[test]
    fn test_cli_overrides_toml() {
        let config = parse_toml_string(
            "[coordinator]\nnodes = [\"a:1\"]\nretries = 3\n[node]\nlisten_port = 9000\n",
        )
        .unwrap();

        let cli = parse_cli(&[
            "--host-list", "b:2,c",
            "--worker-port", "4000",
            "--request-timeout", "10s",
            "--retries", "0",
            "--listen-port", "9100",
        ]);

        let merged = merge_cli_with_config(&cli, config).unwrap();
        assert_eq!(merged.coordinator.nodes, vec![
            NodeAddress::new("b", 2),
            NodeAddress::new("c", 4000),
        ]);
        assert_eq!(merged.coordinator.request_timeout_ms, 10_000);
        assert_eq!(merged.coordinator.retries, 0);
        assert_eq!(merged.node.listen_port, 9100);
    }

    #[test]
    fn test_invalid_listen_port_falls_back() {
        let mut config = Config::default();
        config.node.listen_port = 9000;
        let cli = parse_cli(&["--mode", "service", "--listen-port", "bogus"]);
        let merged = merge_cli_with_config(&cli, config).unwrap();
        assert_eq!(merged.node.listen_port, DEFAULT_NODE_PORT);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("distsort.toml");
        std::fs::write(&path, "[coordinator]\nnodes = [\"127.0.0.1:12345\"]\n").unwrap();

        let cli = parse_cli(&["--config", path.to_str().unwrap()]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.coordinator.nodes.len(), 1);
    }
}
