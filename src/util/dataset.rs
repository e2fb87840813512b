//! Input generation
//!
//! Uniformly random 8-bit values from a fast non-crypto RNG. A fixed seed
//! reproduces the same sequence.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Generate `len` random values, seeded if `seed` is given
pub fn generate_random(len: usize, seed: Option<u64>) -> Vec<i8> {
    let mut rng = match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    };

    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes.into_iter().map(|b| b as i8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(generate_random(0, None).len(), 0);
        assert_eq!(generate_random(1234, None).len(), 1234);
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(generate_random(256, Some(7)), generate_random(256, Some(7)));
        assert_ne!(generate_random(256, Some(7)), generate_random(256, Some(8)));
    }

    #[test]
    fn test_covers_negative_and_positive() {
        let data = generate_random(10_000, Some(1));
        assert!(data.iter().any(|&v| v < 0));
        assert!(data.iter().any(|&v| v > 0));
    }
}
