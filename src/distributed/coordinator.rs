//! Distributed coordinator
//!
//! This module implements the coordinator for distributed mode.
//! The coordinator:
//! - Partitions the input into one balanced contiguous range per node
//! - Dispatches every partition concurrently over its own connection
//! - Waits for all dispatch tasks (join barrier)
//! - Fails the whole operation if any node did not answer
//! - Reduces the sorted partitions, in assignment order, into one sequence

use crate::config::{CoordinatorConfig, NodeAddress};
use crate::distributed::protocol::*;
use crate::error::{Result, SortError};
use crate::sort::{balanced_ranges, reduce_sorted};
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Distributed coordinator
///
/// Orchestrates one sort operation across a fixed set of worker nodes.
pub struct DistributedCoordinator {
    config: CoordinatorConfig,

    /// Largest request body sent to a node
    max_frame_bytes: usize,
}

/// Per-dispatch timeouts and retry budget
#[derive(Debug, Clone, Copy)]
struct DispatchPolicy {
    connect_timeout: Duration,
    request_timeout: Duration,
    attempts: u32,
}

impl From<&CoordinatorConfig> for DispatchPolicy {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            attempts: config.retries.saturating_add(1),
        }
    }
}

/// One partition, encoded once and reused across attempts
struct EncodedPartition {
    elements: usize,
    /// `None` for an empty partition
    frame: Option<Vec<u8>>,
}

impl DistributedCoordinator {
    /// Create a new distributed coordinator
    ///
    /// Fails with [`SortError::NoWorkersConfigured`] if `config.nodes` is empty.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        if config.nodes.is_empty() {
            return Err(SortError::NoWorkersConfigured);
        }
        Ok(Self {
            config,
            max_frame_bytes: MAX_FRAME_BYTES,
        })
    }

    /// Cap the request body size, e.g. to match nodes reading with a lower limit
    ///
    /// Values above [`MAX_FRAME_BYTES`] are clamped.
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes.min(MAX_FRAME_BYTES);
        self
    }

    /// Worker nodes, in partition assignment order
    pub fn nodes(&self) -> &[NodeAddress] {
        &self.config.nodes
    }

    /// Sort `data` across the configured worker nodes
    ///
    /// Every partition is encoded before any node is contacted; a partition
    /// too large for one frame fails with [`SortError::FrameTooLarge`].
    /// Otherwise returns [`SortError::WorkerUnresponsive`] naming the first
    /// failed node (in assignment order) if any partition could not be
    /// sorted. No partial result is returned.
    pub async fn sort(&self, data: &[i8]) -> Result<Vec<i8>> {
        let policy = DispatchPolicy::from(&self.config);
        let ranges = balanced_ranges(data.len(), self.config.nodes.len());

        let mut partitions = Vec::with_capacity(ranges.len());
        for range in ranges {
            let elements = range.len();
            let frame = if elements == 0 {
                None
            } else {
                let request = Message::SortRequest(SortRequest::new(&data[range])?);
                Some(serialize_message_with_limit(&request, self.max_frame_bytes)?)
            };
            partitions.push(EncodedPartition { elements, frame });
        }

        info!(
            elements = data.len(),
            nodes = self.config.nodes.len(),
            "Dispatching partitions"
        );

        let mut handles = Vec::with_capacity(partitions.len());
        for (address, partition) in self.config.nodes.iter().zip(partitions) {
            let task_address = address.clone();
            let handle = tokio::spawn(async move {
                dispatch_partition(&task_address, partition, policy).await
            });
            handles.push((address.clone(), handle));
        }

        // Join barrier: every dispatch task finishes before anything is reduced
        let mut sorted_parts = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (address, handle) in handles {
            match handle.await {
                Ok(Ok(part)) => sorted_parts.push(part),
                Ok(Err(e)) => {
                    error!(%address, "Partition failed: {}", e);
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    error!(%address, "Dispatch task failed: {}", e);
                    failure.get_or_insert(SortError::WorkerUnresponsive {
                        address: address.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        Ok(reduce_sorted(sorted_parts))
    }
}

/// Sort one partition on one node, retrying over a fresh connection
///
/// Any failure is reported as [`SortError::WorkerUnresponsive`].
async fn dispatch_partition(
    address: &NodeAddress,
    partition: EncodedPartition,
    policy: DispatchPolicy,
) -> Result<Vec<i8>> {
    let Some(frame) = partition.frame else {
        // Fewer elements than nodes; nothing to send
        debug!(%address, "Empty partition, skipping node");
        return Ok(Vec::new());
    };

    let mut last_error = None;
    for attempt in 1..=policy.attempts {
        match exchange(address, &frame, partition.elements, &policy).await {
            Ok(sorted) => {
                debug!(%address, attempt, elements = sorted.len(), "Partition sorted");
                return Ok(sorted);
            }
            Err(e) => {
                warn!(%address, attempt, max_attempts = policy.attempts, "Dispatch attempt failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    Err(SortError::WorkerUnresponsive {
        address: address.to_string(),
        reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
    })
}

/// One connection: request, response, termination
async fn exchange(
    address: &NodeAddress,
    frame: &[u8],
    elements: usize,
    policy: &DispatchPolicy,
) -> Result<Vec<i8>> {
    let target = address.to_string();
    let mut stream = timeout(policy.connect_timeout, TcpStream::connect(&target))
        .await
        .map_err(|_| timed_out("connect", policy.connect_timeout))??;
    // Latency hint only
    let _ = stream.set_nodelay(true);

    info!(%address, elements, "Connected, sending sort request");

    let reply = timeout(policy.request_timeout, async {
        write_frame(&mut stream, frame).await?;
        read_message(&mut stream).await
    })
    .await
    .map_err(|_| timed_out("sort request", policy.request_timeout))??;

    let sorted = match reply {
        Message::SortResponse(response) => response.into_data(),
        other => {
            return Err(SortError::violation(format!(
                "expected SortResponse, got {}",
                other.kind()
            )))
        }
    };

    if sorted.len() != elements {
        return Err(SortError::violation(format!(
            "response has {} elements, request had {}",
            sorted.len(),
            elements
        )));
    }
    if !sorted.windows(2).all(|w| w[0] <= w[1]) {
        return Err(SortError::violation("response is not sorted"));
    }

    write_message(&mut stream, &Message::Termination).await?;
    let _ = stream.shutdown().await;
    debug!(%address, "Termination sent");

    Ok(sorted)
}

fn timed_out(what: &str, after: Duration) -> SortError {
    SortError::Io(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{} timed out after {:?}", what, after),
    ))
}
