//! Output formatting and persistence

pub mod text;

pub use text::{print_summary, write_sequence, RunSummary};
