//! Balanced contiguous splitting
//!
//! Used for both the coordinator's partitions and the local sorter's
//! segments: `n` elements over `parts` ranges, where the first `n % parts`
//! ranges get one extra element.

use std::ops::Range;

/// Sizes of `parts` balanced contiguous ranges covering `n` elements
///
/// Returns an empty vector when `parts` is zero.
pub fn balanced_sizes(n: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = n / parts;
    let extra = n % parts;
    (0..parts)
        .map(|i| base + usize::from(i < extra))
        .collect()
}

/// Index ranges of `parts` balanced contiguous ranges covering `0..n`
pub fn balanced_ranges(n: usize, parts: usize) -> Vec<Range<usize>> {
    let mut start = 0;
    balanced_sizes(n, parts)
        .into_iter()
        .map(|size| {
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_sum_and_spread() {
        for n in [0usize, 1, 5, 6, 7, 100, 1001] {
            for parts in 1..=9 {
                let sizes = balanced_sizes(n, parts);
                assert_eq!(sizes.len(), parts);
                assert_eq!(sizes.iter().sum::<usize>(), n);

                let ceil = (n + parts - 1) / parts;
                let floor = n / parts;
                let big = sizes.iter().filter(|&&s| s == ceil && ceil != floor).count();
                if ceil != floor {
                    assert_eq!(big, n % parts);
                }
                assert!(sizes.iter().all(|&s| s == ceil || s == floor));
            }
        }
    }

    #[test]
    fn test_extra_elements_go_first() {
        assert_eq!(balanced_sizes(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(balanced_sizes(2, 3), vec![1, 1, 0]);
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let ranges = balanced_ranges(6, 2);
        assert_eq!(ranges, vec![0..3, 3..6]);

        let ranges = balanced_ranges(11, 3);
        assert_eq!(ranges, vec![0..4, 4..8, 8..11]);
    }

    #[test]
    fn test_zero_parts() {
        assert!(balanced_sizes(10, 0).is_empty());
        assert!(balanced_ranges(10, 0).is_empty());
    }
}
