//! Timing utilities for the baseline/distributed comparison

use std::time::{Duration, Instant};

/// Run `f` and return its result together with the wall time it took
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use distsort::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Ratio of `baseline` to `candidate` wall time (>1.0 means candidate was faster)
pub fn speedup(baseline: Duration, candidate: Duration) -> f64 {
    let candidate = candidate.as_secs_f64();
    if candidate > 0.0 {
        baseline.as_secs_f64() / candidate
    } else {
        0.0
    }
}

/// Format an element count with thousands separators
///
/// # Examples
///
/// ```
/// use distsort::util::time::format_count;
///
/// assert_eq!(format_count(200000), "200,000");
/// ```
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timed() {
        let (value, elapsed) = timed(|| {
            thread::sleep(Duration::from_millis(10));
            42
        });
        assert_eq!(value, 42);
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.50us");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_speedup() {
        assert_eq!(speedup(Duration::from_secs(4), Duration::from_secs(2)), 2.0);
        assert_eq!(speedup(Duration::from_secs(4), Duration::ZERO), 0.0);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
