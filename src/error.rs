//! Error types for distsort
//!
//! Library operations (protocol, node service, coordinator) return
//! [`SortError`]. The binary wraps these with `anyhow` context.

use thiserror::Error;

/// Errors raised by a distributed sort operation
#[derive(Debug, Error)]
pub enum SortError {
    /// A request or response was built with an empty payload
    #[error("Invalid message: {0}")]
    InvalidMessage(&'static str),

    /// A peer sent a message of an unexpected kind or shape
    #[error("Protocol violation: {detail}")]
    ProtocolViolation { detail: String },

    /// The coordinator was created with an empty address list
    #[error("No worker nodes configured")]
    NoWorkersConfigured,

    /// A dispatch task could not obtain a sorted response from its node
    #[error("Worker node {address} unresponsive: {reason}")]
    WorkerUnresponsive { address: String, reason: String },

    /// An outgoing message does not fit in one frame; raised before any send
    #[error("Frame too large: {bytes} bytes (max {max})")]
    FrameTooLarge { bytes: usize, max: usize },

    /// The peer closed the connection in an orderly way
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SortError {
    pub(crate) fn violation(detail: impl Into<String>) -> Self {
        SortError::ProtocolViolation {
            detail: detail.into(),
        }
    }

    /// True for errors after which the stream is still usable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SortError::ProtocolViolation { .. })
    }
}

/// Result type used by the sort library
pub type Result<T> = std::result::Result<T, SortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_unresponsive_names_address() {
        let err = SortError::WorkerUnresponsive {
            address: "10.0.1.10:12345".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.0.1.10:12345"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_only_violations_are_recoverable() {
        assert!(SortError::violation("bad tag").is_recoverable());
        assert!(!SortError::ConnectionClosed.is_recoverable());
        assert!(!SortError::NoWorkersConfigured.is_recoverable());
        assert!(!SortError::FrameTooLarge { bytes: 9, max: 8 }.is_recoverable());
    }
}
