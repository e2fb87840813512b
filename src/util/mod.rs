//! Utility modules

pub mod dataset;
pub mod time;
pub mod verification;
