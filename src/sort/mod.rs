//! Local parallel sorter
//!
//! Used by worker nodes to sort a partition across local threads, and by the
//! coordinator (in reduction mode) to combine sorted partitions.
//!
//! # Local-sort mode
//!
//! ```text
//! [ ------------------ working buffer ------------------ ]
//! [ seg 0 ][ seg 1 ][ seg 2 ][ seg 3 ][ seg 4 ]             sort each on its own thread
//! [ seg 0 + seg 1  ][ seg 2 + seg 3  ][ seg 4 ]             merge adjacent pairs
//! [ seg 0..3                         ][ seg 4 ]
//! [ seg 0..4                                  ]
//! ```

pub mod merge;
pub mod partition;

pub use merge::{merge, merge_adjacent, merge_sort};
pub use partition::{balanced_ranges, balanced_sizes};

use std::ops::Range;

/// Splits data into segments, sorts them concurrently, and reduces them
/// pairwise into one sorted run.
#[derive(Debug, Clone, Copy)]
pub struct LocalSorter {
    parallelism: usize,
}

impl LocalSorter {
    /// Create a sorter that uses `parallelism` segments (clamped to at least 1)
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    /// Create a sorter sized to the host's hardware concurrency
    pub fn from_available_parallelism() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Sort a copy of `data`
    ///
    /// Inputs shorter than `2 * parallelism` (or any input when parallelism is
    /// 1) are sorted sequentially. The returned vector is owned by the caller
    /// and shares nothing with `data`.
    pub fn sort(&self, data: &[i8]) -> Vec<i8> {
        let mut working = data.to_vec();
        let p = self.parallelism;

        if p < 2 || working.len() < 2 * p {
            merge_sort(&mut working);
            return working;
        }

        let segments = balanced_ranges(working.len(), p);
        sort_segments(&mut working, &segments);
        reduce_segments(&mut working, segments);
        working
    }
}

impl Default for LocalSorter {
    fn default() -> Self {
        Self::from_available_parallelism()
    }
}

/// Sort each segment on its own scoped thread
///
/// Segments are handed out as disjoint `&mut` slices. The scope is the join
/// barrier: it returns only after every segment thread has finished.
fn sort_segments(data: &mut [i8], segments: &[Range<usize>]) {
    std::thread::scope(|scope| {
        let mut rest = data;
        for segment in segments {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(segment.len());
            rest = tail;
            scope.spawn(move || merge_sort(head));
        }
    });
}

/// Binary reduction over sorted, adjacent segments
///
/// Each round merges neighbours (0,1), (2,3), ... in place. An odd segment at
/// the end of a round is carried forward unmerged.
fn reduce_segments(data: &mut [i8], mut segments: Vec<Range<usize>>) {
    while segments.len() > 1 {
        let mut next = Vec::with_capacity((segments.len() + 1) / 2);
        for pair in segments.chunks(2) {
            if let [left, right] = pair {
                merge_adjacent(&mut data[left.start..right.end], left.len());
                next.push(left.start..right.end);
            } else {
                next.push(pair[0].clone());
            }
        }
        segments = next;
    }
}

/// Reduction mode: fold sorted runs left to right with the two-way merge
///
/// `parts` must be in original partition order. Returns an empty vector when
/// there are no parts.
pub fn reduce_sorted(parts: Vec<Vec<i8>>) -> Vec<i8> {
    let mut parts = parts.into_iter();
    let Some(first) = parts.next() else {
        return Vec::new();
    };
    parts.fold(first, |acc, part| merge(&acc, &part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dataset::generate_random;

    fn std_sorted(data: &[i8]) -> Vec<i8> {
        let mut v = data.to_vec();
        v.sort();
        v
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let data = generate_random(10_000, Some(7));
        let sequential = LocalSorter::new(1).sort(&data);
        let parallel = LocalSorter::new(8).sort(&data);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel, std_sorted(&data));
    }

    #[test]
    fn test_odd_segment_counts() {
        let data = generate_random(1_003, Some(42));
        let expected = std_sorted(&data);
        for p in [2, 3, 5, 7, 9] {
            assert_eq!(LocalSorter::new(p).sort(&data), expected, "parallelism {}", p);
        }
    }

    #[test]
    fn test_small_input_takes_sequential_path() {
        // 2 * 8 > 6, so this never fans out
        let data = vec![5, -3, 0, 127, -128, 1];
        assert_eq!(LocalSorter::new(8).sort(&data), vec![-128, -3, 0, 1, 5, 127]);
    }

    #[test]
    fn test_exact_threshold() {
        let data: Vec<i8> = (0..16).rev().map(|i| i as i8).collect();
        let sorted = LocalSorter::new(8).sort(&data);
        assert_eq!(sorted, (0..16).map(|i| i as i8).collect::<Vec<_>>());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let data = vec![3, 2, 1];
        let sorted = LocalSorter::new(1).sort(&data);
        assert_eq!(data, vec![3, 2, 1]);
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(LocalSorter::new(4).sort(&[]).is_empty());
    }

    #[test]
    fn test_parallelism_is_clamped() {
        assert_eq!(LocalSorter::new(0).parallelism(), 1);
        assert!(LocalSorter::from_available_parallelism().parallelism() >= 1);
    }

    #[test]
    fn test_reduce_sorted_scenario() {
        let out = reduce_sorted(vec![vec![-3, 0, 5], vec![-128, 1, 127]]);
        assert_eq!(out, vec![-128, -3, 0, 1, 5, 127]);
    }

    #[test]
    fn test_partition_then_reduce_matches_full_sort() {
        let data = generate_random(5_000, Some(99));
        let expected = std_sorted(&data);

        for n in 1..=7 {
            let parts: Vec<Vec<i8>> = balanced_ranges(data.len(), n)
                .into_iter()
                .map(|r| std_sorted(&data[r]))
                .collect();
            assert_eq!(reduce_sorted(parts), expected, "{} partitions", n);
        }
    }

    #[test]
    fn test_reduce_sorted_empty_and_single() {
        assert!(reduce_sorted(Vec::new()).is_empty());
        assert_eq!(reduce_sorted(vec![vec![1, 2, 3]]), vec![1, 2, 3]);
        assert_eq!(reduce_sorted(vec![vec![], vec![4]]), vec![4]);
    }
}
