//! Human-readable text output

use crate::util::time::{format_count, format_duration, speedup};
use crate::util::verification::VerificationFailure;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of one coordinator run, for console reporting
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub elements: usize,
    pub nodes: usize,
    /// Sequential merge sort wall time (None if skipped)
    pub baseline: Option<Duration>,
    pub distributed: Duration,
    pub verification: Result<(), VerificationFailure>,
    pub output_path: PathBuf,
}

/// Write a sequence as text, one signed decimal value per line
pub fn write_sequence(path: &Path, data: &[i8]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for value in data {
        writeln!(writer, "{}", value)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    }

    writer.flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}

/// Print run results to console
pub fn print_summary(summary: &RunSummary) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    SORT RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Elements:     {}", format_count(summary.elements));
    println!("Worker nodes: {}", summary.nodes);
    println!();

    if let Some(baseline) = summary.baseline {
        println!("Sequential:   {}", format_duration(baseline));
    }
    println!("Distributed:  {}", format_duration(summary.distributed));
    if let Some(baseline) = summary.baseline {
        println!("Speedup:      {:.2}x", speedup(baseline, summary.distributed));
    }
    println!();

    match &summary.verification {
        Ok(()) => println!("Verification: ✅ sorted permutation of input"),
        Err(e) => println!("Verification: ❌ {}", e),
    }
    println!("Output:       {}", summary.output_path.display());
}
