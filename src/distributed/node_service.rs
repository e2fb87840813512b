//! Node service for distributed mode
//!
//! This module implements the worker node service. The node service:
//! - Listens for connections from coordinators
//! - Serves each connection in its own task, bounded by a permit pool
//! - Sorts each request's partition with the local parallel sorter
//! - Replies on the same connection until the coordinator terminates it

use crate::config::NodeConfig;
use crate::distributed::protocol::*;
use crate::error::{Result, SortError};
use crate::sort::LocalSorter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept (e.g. EMFILE) before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Node service
///
/// Runs on each worker node, accepting sort requests from coordinators.
pub struct NodeService {
    listener: TcpListener,

    /// Node identifier (hostname)
    node_id: String,

    sorter: LocalSorter,

    /// One permit per connection being served
    permits: Arc<Semaphore>,
}

/// What happened on one connection
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    /// Sort requests answered
    pub requests: usize,
    /// Malformed or unexpected messages skipped
    pub violations: usize,
    /// Connection ended with a Termination message (not a bare close)
    pub terminated: bool,
}

impl NodeService {
    /// Bind the node service on all interfaces at `config.listen_port`
    pub async fn bind(config: &NodeConfig) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
        Self::bind_to(addr, config).await
    }

    /// Bind the node service on a specific address
    pub async fn bind_to(addr: SocketAddr, config: &NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        let sorter = match config.parallelism {
            Some(p) => LocalSorter::new(p),
            None => LocalSorter::from_available_parallelism(),
        };

        Ok(Self {
            listener,
            node_id: get_node_id(),
            sorter,
            permits: Arc::new(Semaphore::new(config.max_connections.max(1))),
        })
    }

    /// Address the service is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the node service
    ///
    /// Accepts connections until the task is dropped or aborted. When every
    /// permit is in use, new connections wait in the listen backlog.
    pub async fn run(self) -> Result<()> {
        info!(
            node_id = %self.node_id,
            addr = %self.local_addr()?,
            parallelism = self.sorter.parallelism(),
            max_connections = self.permits.available_permits(),
            "Node service listening"
        );

        loop {
            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                // Semaphore closed; nothing more can be served
                return Ok(());
            };

            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    drop(permit);
                    back_off_after_accept_error(&e).await;
                    continue;
                }
            };

            info!(%peer, "New connection");
            let sorter = self.sorter;

            tokio::spawn(async move {
                let _permit = permit;
                let peer = peer.to_string();
                match handle_connection(stream, &peer, sorter).await {
                    Ok(summary) => debug!(%peer, ?summary, "Connection finished"),
                    Err(e) => warn!(%peer, "Connection failed: {}", e),
                }
            });
        }
    }
}

/// Serve one connection until Termination or peer close
///
/// Each request's data is copied out of the message and sorted on a blocking
/// thread. Unexpected or malformed messages are logged and skipped; the
/// connection stays open.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: &str,
    sorter: LocalSorter,
) -> Result<ConnectionSummary>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut summary = ConnectionSummary::default();

    loop {
        match read_message(&mut stream).await {
            Ok(Message::Termination) => {
                info!(%peer, "Termination received, closing connection");
                summary.terminated = true;
                break;
            }
            Ok(Message::SortRequest(request)) => {
                let data = request.into_data();
                info!(%peer, elements = data.len(), "Sort request received");

                let sorted = tokio::task::spawn_blocking(move || sorter.sort(&data))
                    .await
                    .map_err(|e| SortError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

                let response = SortResponse::new(&sorted)?;
                write_message(&mut stream, &Message::SortResponse(response)).await?;
                summary.requests += 1;
                info!(%peer, elements = sorted.len(), "Response sent");
            }
            Ok(other) => {
                warn!(%peer, "Unexpected {} message, ignoring", other.kind());
                summary.violations += 1;
            }
            Err(SortError::ConnectionClosed) => {
                info!(%peer, "Peer closed the connection");
                break;
            }
            Err(e) if e.is_recoverable() => {
                warn!(%peer, "Skipping malformed message: {}", e);
                summary.violations += 1;
            }
            Err(e) => return Err(e),
        }
    }

    // Peer may already be gone
    let _ = stream.shutdown().await;
    Ok(summary)
}

async fn back_off_after_accept_error(e: &std::io::Error) {
    error!("Failed to accept connection: {}, retrying in {:?}", e, ACCEPT_BACKOFF);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// Get node identifier (hostname)
fn get_node_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
