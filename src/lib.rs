//! distsort - Distributed parallel merge sort
//!
//! distsort sorts large sequences of 8-bit signed integers by splitting them
//! across a fixed set of worker nodes, sorting each share in parallel on the
//! node, and merging the sorted shares back on the coordinator.
//!
//! # Architecture
//!
//! - **Local sorter**: segment fan-out across threads plus a pairwise merge tree
//! - **Node service**: serves sort requests over TCP, one task per connection
//! - **Coordinator**: balanced partitioning, concurrent dispatch, ordered reduction
//! - **Protocol**: length-prefixed MessagePack frames (request, response, termination)

pub mod config;
pub mod distributed;
pub mod error;
pub mod output;
pub mod sort;
pub mod util;

// Re-export commonly used types
pub use config::{Config, CoordinatorConfig, NodeAddress, NodeConfig};
pub use distributed::{DistributedCoordinator, NodeService};
pub use error::SortError;
pub use sort::LocalSorter;

/// Result type used by the sort library
pub type Result<T> = error::Result<T>;
