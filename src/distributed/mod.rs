//! Distributed mode implementation
//!
//! This module implements sorting across multiple worker nodes.
//!
//! # Architecture
//!
//! distsort uses a coordinator-node architecture:
//!
//! - **Coordinator**: Partitions the input, dispatches one partition per node, merges results
//! - **Node Service**: Runs on nodes, sorts each partition across local threads
//!
//! # Modules
//!
//! - `protocol`: Message definitions and framing
//! - `node_service`: Worker node service
//! - `coordinator`: Distributed coordinator

pub mod protocol;
pub mod node_service;
pub mod coordinator;

// Re-export key types
pub use protocol::{
    Message,
    SortRequest,
    SortResponse,
    read_message,
    read_message_with_limit,
    write_message,
    write_frame,
    serialize_message,
    serialize_message_with_limit,
    deserialize_message,
    MAX_FRAME_BYTES,
};

pub use node_service::{NodeService, ConnectionSummary, handle_connection};
pub use coordinator::DistributedCoordinator;
