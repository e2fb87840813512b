//! CLI to Config conversion utilities

use crate::config::{NodeAddress, DEFAULT_NODE_PORT};
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a size string (e.g., "200000", "64k", "1M") to an element count
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Parse a timeout string (e.g., "500ms", "5s", "2m") to milliseconds
///
/// A bare number is taken as seconds.
pub fn parse_duration_ms(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("ms") {
        (s.trim_end_matches("ms"), 1u64)
    } else if s.ends_with("s") || s.ends_with("sec") {
        (s.trim_end_matches("sec").trim_end_matches("s"), 1000)
    } else if s.ends_with("m") || s.ends_with("min") {
        (s.trim_end_matches("min").trim_end_matches("m"), 60_000)
    } else {
        (s.as_str(), 1000)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Resolve the node listening port, falling back to the default
///
/// Absent or unparseable values (including port 0) yield
/// [`DEFAULT_NODE_PORT`]. Returns the port and whether the fallback was used
/// for a value that was actually supplied.
pub fn resolve_listen_port(raw: Option<&str>) -> (u16, bool) {
    match raw {
        None => (DEFAULT_NODE_PORT, false),
        Some(s) => match s.trim().parse::<u16>() {
            Ok(port) if port != 0 => (port, false),
            _ => (DEFAULT_NODE_PORT, true),
        },
    }
}

/// Parse a comma-separated node list (e.g., "10.0.1.10:12345,10.0.1.11")
pub fn parse_host_list(list: &str, default_port: u16) -> Result<Vec<NodeAddress>> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| NodeAddress::parse_with_default(s, default_port))
        .collect()
}

/// Read node addresses from a file (one per line, `#` comments allowed)
pub fn read_clients_file(path: &Path, default_port: u16) -> Result<Vec<NodeAddress>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read clients file: {}", path.display()))?;

    content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| NodeAddress::parse_with_default(line, default_port))
        .collect()
}
