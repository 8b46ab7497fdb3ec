//! Static band partitioning across workers
//!
//! `num_bands` bands are split into `num_threads` contiguous ranges laid out
//! in worker order. The first `num_bands % num_threads` workers take one extra
//! band; workers beyond `num_bands` get an empty range.

use std::ops::Range;

/// Band range owned by `worker_id`
///
/// # Arguments
/// * `worker_id` - Worker index in `0..num_threads`
/// * `num_bands` - Total number of bands
/// * `num_threads` - Number of workers (>= 1)
pub fn assign(worker_id: usize, num_bands: usize, num_threads: usize) -> Range<usize> {
    debug_assert!(num_threads > 0 && worker_id < num_threads);

    let base = num_bands / num_threads;
    let extra = num_bands % num_threads;

    let start = worker_id * base + worker_id.min(extra);
    let size = if worker_id < extra { base + 1 } else { base };

    start..start + size
}

/// Ranges for every worker, in worker order
pub fn assignments(num_bands: usize, num_threads: usize) -> Vec<Range<usize>> {
    (0..num_threads)
        .map(|worker_id| assign(worker_id, num_bands, num_threads))
        .collect()
}

/// Split a per-band table into one disjoint mutable slice per worker
///
/// Slice `i` covers exactly `assign(i, table.len(), num_threads)`.
pub fn partition_slices<T>(table: &mut [T], num_threads: usize) -> Vec<(Range<usize>, &mut [T])> {
    let num_bands = table.len();
    let mut rest = table;
    let mut parts = Vec::with_capacity(num_threads);

    for worker_id in 0..num_threads {
        let range = assign(worker_id, num_bands, num_threads);
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        rest = tail;
        parts.push((range, head));
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_each_band_once() {
        for num_bands in 1..=40 {
            for num_threads in 1..=12 {
                let ranges = assignments(num_bands, num_threads);
                let mut seen = vec![0u32; num_bands];

                let mut expected_start = 0;
                for range in &ranges {
                    assert_eq!(range.start, expected_start, "gap or overlap at {:?}", range);
                    expected_start = range.end;
                    for band in range.clone() {
                        seen[band] += 1;
                    }
                }

                assert_eq!(expected_start, num_bands);
                assert!(seen.iter().all(|&count| count == 1),
                        "bands={} threads={}", num_bands, num_threads);

                let min = ranges.iter().map(|r| r.len()).min().unwrap();
                let max = ranges.iter().map(|r| r.len()).max().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn test_extra_bands_go_to_first_workers() {
        let ranges = assignments(10, 4);
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn test_more_threads_than_bands() {
        let ranges = assignments(3, 5);
        assert_eq!(ranges[0], 0..1);
        assert_eq!(ranges[2], 2..3);
        assert!(ranges[3].is_empty());
        assert!(ranges[4].is_empty());
        assert_eq!(ranges[4].start, 3);
    }

    #[test]
    fn test_partition_slices_match_assignments() {
        let mut table: Vec<usize> = vec![0; 11];
        let parts = partition_slices(&mut table, 3);

        assert_eq!(parts.len(), 3);
        for (range, slice) in parts {
            assert_eq!(range.len(), slice.len());
            for (slot, band) in slice.iter_mut().zip(range) {
                *slot = band;
            }
        }

        assert_eq!(table, (0..11).collect::<Vec<_>>());
    }
}
