//! distsort CLI entry point

use anyhow::{Context, Result};
use distsort::config::cli::{Cli, ExecutionMode};
use distsort::config::cli_convert::parse_size;
use distsort::config::toml::load_config;
use distsort::config::{Config, CoordinatorConfig, NodeAddress};
use distsort::output::{print_summary, write_sequence, RunSummary};
use distsort::sort::merge_sort;
use distsort::util::dataset::generate_random;
use distsort::util::time::timed;
use distsort::util::verification::verify_sorted;
use distsort::{DistributedCoordinator, NodeService};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;
    init_logging(cli.debug);

    println!("distsort v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed parallel merge sort");
    println!();

    let config = load_config(&cli).context("Failed to load configuration")?;

    match cli.mode {
        ExecutionMode::Service => run_service(config),
        ExecutionMode::Coordinator => run_coordinator(&cli, config),
        ExecutionMode::Standalone => run_standalone(&cli, config),
    }
}

/// Set up logging (RUST_LOG overrides the --debug level)
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Run as a worker node until Ctrl-C
fn run_service(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let service = NodeService::bind(&config.node)
            .await
            .with_context(|| format!("Failed to bind node service on port {}", config.node.listen_port))?;

        tokio::select! {
            result = service.run() => result.context("Node service failed"),
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down node service");
                Ok(())
            }
        }
    })
}

/// Run in coordinator mode against the configured worker nodes
fn run_coordinator(cli: &Cli, config: Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    run_sort(cli, &runtime, config.coordinator)
}

/// Run in standalone mode (in-process worker nodes on localhost)
fn run_standalone(cli: &Cli, config: Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    let mut nodes = Vec::with_capacity(cli.local_nodes);
    let mut services = Vec::with_capacity(cli.local_nodes);

    for _ in 0..cli.local_nodes {
        let service = runtime
            .block_on(NodeService::bind_to(SocketAddr::from(([127, 0, 0, 1], 0)), &config.node))
            .context("Failed to start local node service")?;
        let addr = service.local_addr()?;
        nodes.push(NodeAddress::new("127.0.0.1", addr.port()));
        services.push(runtime.spawn(service.run()));
    }

    info!(nodes = nodes.len(), "Local node services started");

    let coordinator_config = CoordinatorConfig {
        nodes,
        ..config.coordinator
    };
    let result = run_sort(cli, &runtime, coordinator_config);

    for service in services {
        service.abort();
    }

    result
}

/// Generate input, sort it across the nodes, verify, and persist
fn run_sort(
    cli: &Cli,
    runtime: &tokio::runtime::Runtime,
    coordinator_config: CoordinatorConfig,
) -> Result<()> {
    let size = parse_size(&cli.size).context("Invalid size")?;
    let size = usize::try_from(size).context("Size does not fit in memory on this platform")?;

    let coordinator = DistributedCoordinator::new(coordinator_config)
        .context("Failed to create coordinator")?;

    let nodes = coordinator.nodes().len();
    println!("Sorting {} elements across {} worker node(s)", size, nodes);
    for node in coordinator.nodes() {
        println!("  {}", node);
    }
    println!();

    let input = generate_random(size, cli.seed);

    let baseline = if cli.skip_baseline {
        None
    } else {
        let mut copy = input.clone();
        let ((), elapsed) = timed(|| merge_sort(&mut copy));
        Some(elapsed)
    };

    let start = std::time::Instant::now();
    let sorted = runtime
        .block_on(coordinator.sort(&input))
        .context("Distributed sort failed")?;
    let distributed = start.elapsed();

    let verification = verify_sorted(&input, &sorted);
    if let Err(ref e) = verification {
        warn!("Verification failed: {}", e);
    }

    write_sequence(&cli.output, &sorted)?;

    print_summary(&RunSummary {
        elements: sorted.len(),
        nodes,
        baseline,
        distributed,
        verification: verification.clone(),
        output_path: cli.output.clone(),
    });

    verification.context("Sorted output failed verification")
}
