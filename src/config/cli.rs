//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Coordinator mode - partition input and dispatch to worker nodes
    Coordinator,
    /// Service mode - run a worker node that serves sort requests
    Service,
    /// Standalone mode - start local worker nodes in-process and coordinate them
    Standalone,
}

/// distsort - distributed parallel merge sort
#[derive(Parser, Debug)]
#[command(name = "distsort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: coordinator, service, or standalone
    #[arg(long, value_enum, default_value = "standalone")]
    pub mode: ExecutionMode,

    /// TOML configuration file (CLI flags take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Service Options ===
    /// Port for the worker node to listen on (falls back to 12345 if invalid)
    #[arg(long)]
    pub listen_port: Option<String>,

    /// Maximum concurrent connections per worker node
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Segments per local sort (defaults to available CPUs)
    #[arg(long)]
    pub parallelism: Option<usize>,

    // === Coordinator Options ===
    /// Comma-separated list of node addresses (e.g., "10.0.1.10:12345,10.0.1.11:12345")
    #[arg(long, env = "DISTSORT_HOST_LIST")]
    pub host_list: Option<String>,

    /// File containing list of node addresses (one per line)
    #[arg(long)]
    pub clients_file: Option<PathBuf>,

    /// Port to use for node addresses given without one
    #[arg(long, default_value = "12345")]
    pub worker_port: u16,

    /// Number of elements to sort (e.g., 200000, 64k, 1M)
    #[arg(short = 's', long, default_value = "200000")]
    pub size: String,

    /// Seed for input generation (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the sorted sequence (one value per line)
    #[arg(short = 'o', long, default_value = "sorted.txt")]
    pub output: PathBuf,

    /// Timeout for connecting to a node (e.g., 500ms, 5s)
    #[arg(long)]
    pub connect_timeout: Option<String>,

    /// Timeout for a node to answer a sort request (e.g., 30s, 2m)
    #[arg(long)]
    pub request_timeout: Option<String>,

    /// Extra dispatch attempts per partition
    #[arg(long)]
    pub retries: Option<u32>,

    /// Skip the sequential baseline sort
    #[arg(long)]
    pub skip_baseline: bool,

    // === Standalone Options ===
    /// Number of in-process worker nodes (standalone mode only)
    #[arg(long, default_value = "2")]
    pub local_nodes: usize,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mode == ExecutionMode::Coordinator
            && self.host_list.is_none()
            && self.clients_file.is_none()
            && self.config.is_none()
        {
            anyhow::bail!("Coordinator mode requires --host-list, --clients-file, or --config");
        }

        if self.host_list.is_some() && self.clients_file.is_some() {
            anyhow::bail!("can only specify one of --host-list or --clients-file");
        }

        if self.mode == ExecutionMode::Standalone && self.local_nodes == 0 {
            anyhow::bail!("local_nodes must be at least 1");
        }

        if self.max_connections == Some(0) {
            anyhow::bail!("max_connections must be at least 1");
        }

        if self.parallelism == Some(0) {
            anyhow::bail!("parallelism must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("distsort").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.mode, ExecutionMode::Standalone);
        assert_eq!(cli.size, "200000");
        assert_eq!(cli.output, PathBuf::from("sorted.txt"));
        assert_eq!(cli.local_nodes, 2);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_coordinator_requires_nodes() {
        let cli = parse(&["--mode", "coordinator"]);
        assert!(cli.validate().is_err());

        let cli = parse(&["--mode", "coordinator", "--host-list", "127.0.0.1:12345"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_conflicting_node_sources() {
        let cli = parse(&[
            "--mode", "coordinator",
            "--host-list", "a:1",
            "--clients-file", "nodes.txt",
        ]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_listen_port_accepts_any_string() {
        let cli = parse(&["--mode", "service", "--listen-port", "not-a-port"]);
        assert_eq!(cli.listen_port.as_deref(), Some("not-a-port"));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(parse(&["--max-connections", "0"]).validate().is_err());
        assert!(parse(&["--parallelism", "0"]).validate().is_err());
        assert!(parse(&["--local-nodes", "0"]).validate().is_err());
    }
}
