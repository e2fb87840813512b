//! Merge primitives
//!
//! The two-way merge is shared by the recursive merge sort, the in-place
//! segment reduction, and the coordinator's partition fold.

/// Merge two sorted runs into a new sorted vector
///
/// Takes from `left` whenever its head is `<=` the head of `right`, so equal
/// values keep their left-to-right order.
pub fn merge(left: &[i8], right: &[i8]) -> Vec<i8> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            out.push(left[i]);
            i += 1;
        } else {
            out.push(right[j]);
            j += 1;
        }
    }

    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out
}

/// Merge the sorted runs `v[..mid]` and `v[mid..]` back into `v`
pub fn merge_adjacent(v: &mut [i8], mid: usize) {
    if mid == 0 || mid >= v.len() {
        return;
    }
    let merged = merge(&v[..mid], &v[mid..]);
    v.copy_from_slice(&merged);
}

/// Sequential top-down merge sort
///
/// Splits at the midpoint, sorts both halves recursively, then merges them.
/// Recursion depth is log2(len).
pub fn merge_sort(v: &mut [i8]) {
    if v.len() < 2 {
        return;
    }
    let mid = v.len() / 2;
    {
        let (left, right) = v.split_at_mut(mid);
        merge_sort(left);
        merge_sort(right);
    }
    merge_adjacent(v, mid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_interleaved() {
        assert_eq!(merge(&[-3, 0, 5], &[-128, 1, 127]), vec![-128, -3, 0, 1, 5, 127]);
    }

    #[test]
    fn test_merge_with_empty_run() {
        assert_eq!(merge(&[], &[1, 2]), vec![1, 2]);
        assert_eq!(merge(&[1, 2], &[]), vec![1, 2]);
        assert!(merge(&[], &[]).is_empty());
    }

    #[test]
    fn test_merge_adjacent_in_place() {
        let mut v = vec![1, 4, 9, -2, 4, 10];
        merge_adjacent(&mut v, 3);
        assert_eq!(v, vec![-2, 1, 4, 4, 9, 10]);
    }

    #[test]
    fn test_merge_adjacent_degenerate_split() {
        let mut v = vec![3, 1, 2];
        merge_adjacent(&mut v, 0);
        assert_eq!(v, vec![3, 1, 2]);
        merge_adjacent(&mut v, 3);
        assert_eq!(v, vec![3, 1, 2]);
    }

    #[test]
    fn test_merge_sort_signed_order() {
        let mut v = vec![5, -3, 0, 127, -128, 1];
        merge_sort(&mut v);
        assert_eq!(v, vec![-128, -3, 0, 1, 5, 127]);
    }

    #[test]
    fn test_merge_sort_matches_std() {
        let mut v: Vec<i8> = (0..1000).map(|i| ((i * 37 + 11) % 256) as u8 as i8).collect();
        let mut expected = v.clone();
        expected.sort();
        merge_sort(&mut v);
        assert_eq!(v, expected);
    }

    #[test]
    fn test_merge_sort_trivial_inputs() {
        let mut empty: Vec<i8> = Vec::new();
        merge_sort(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![-1];
        merge_sort(&mut one);
        assert_eq!(one, vec![-1]);
    }
}
