//! Sort verification utilities
//!
//! Checks that a sorted sequence is ordered and is a permutation of its input.
//! With 8-bit values, the permutation check is a 256-bucket count comparison.

use std::fmt;

/// Why a sorted sequence was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Output length differs from input length
    LengthMismatch { expected: usize, actual: usize },
    /// `output[index] > output[index + 1]`
    OutOfOrder { index: usize, value: i8, next: i8 },
    /// A value occurs a different number of times in input and output
    CountMismatch { value: i8, expected: usize, actual: usize },
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {} elements, got {}", expected, actual)
            }
            VerificationFailure::OutOfOrder { index, value, next } => {
                write!(f, "out of order at index {}: {} > {}", index, value, next)
            }
            VerificationFailure::CountMismatch { value, expected, actual } => {
                write!(f, "value {} occurs {} times, expected {}", value, actual, expected)
            }
        }
    }
}

impl std::error::Error for VerificationFailure {}

/// Verify that `output` is a non-decreasing permutation of `input`
pub fn verify_sorted(input: &[i8], output: &[i8]) -> Result<(), VerificationFailure> {
    if input.len() != output.len() {
        return Err(VerificationFailure::LengthMismatch {
            expected: input.len(),
            actual: output.len(),
        });
    }

    if let Some(index) = output.windows(2).position(|w| w[0] > w[1]) {
        return Err(VerificationFailure::OutOfOrder {
            index,
            value: output[index],
            next: output[index + 1],
        });
    }

    let expected = value_counts(input);
    let actual = value_counts(output);
    for (bucket, (&e, &a)) in expected.iter().zip(actual.iter()).enumerate() {
        if e != a {
            return Err(VerificationFailure::CountMismatch {
                value: bucket_value(bucket),
                expected: e,
                actual: a,
            });
        }
    }

    Ok(())
}

fn value_counts(data: &[i8]) -> [usize; 256] {
    let mut counts = [0usize; 256];
    for &v in data {
        counts[(v as i16 + 128) as usize] += 1;
    }
    counts
}

fn bucket_value(bucket: usize) -> i8 {
    (bucket as i16 - 128) as i8
}
