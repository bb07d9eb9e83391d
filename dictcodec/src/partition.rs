//! Splitting a column into contiguous row ranges for parallel work.

use std::ops::Range;

use crate::{Error, Result};

/// A half-open range of row indexes `[start, end)` over a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "partition start {start} past end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `num_rows` rows across `worker_count` workers.
///
/// Every worker gets `num_rows / worker_count` rows. Rows left over by the
/// division go to one extra trailing partition, so the result holds either
/// `worker_count` or `worker_count + 1` partitions. An empty column produces
/// no partitions at all.
pub fn partitions(num_rows: usize, worker_count: usize) -> Result<Vec<Partition>> {
    if worker_count == 0 {
        return Err(Error::configuration(
            "worker count must be at least 1, got 0",
        ));
    }

    if num_rows == 0 {
        return Ok(vec![]);
    }

    let chunk_size = num_rows / worker_count;
    let mut partitions = (0..worker_count)
        .map(|i| Partition::new(i * chunk_size, (i + 1) * chunk_size))
        .collect::<Vec<_>>();

    let covered = worker_count * chunk_size;
    if covered < num_rows {
        partitions.push(Partition::new(covered, num_rows));
    }

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn even_split() {
        assert_eq!(
            partitions(6, 3).unwrap(),
            vec![
                Partition::new(0, 2),
                Partition::new(2, 4),
                Partition::new(4, 6)
            ]
        );
    }

    #[test]
    fn remainder_goes_to_trailing_partition() {
        assert_eq!(
            partitions(5, 2).unwrap(),
            vec![
                Partition::new(0, 2),
                Partition::new(2, 4),
                Partition::new(4, 5)
            ]
        );
    }

    #[test]
    fn fewer_rows_than_workers() {
        let got = partitions(2, 4).unwrap();
        assert_eq!(got.len(), 5);
        assert!(got[..4].iter().all(Partition::is_empty));
        assert_eq!(got[4], Partition::new(0, 2));
    }

    #[test]
    fn empty_column_has_no_partitions() {
        assert!(partitions(0, 8).unwrap().is_empty());
    }

    #[test]
    fn zero_workers() {
        assert!(matches!(
            partitions(10, 0),
            Err(Error::Configuration { .. })
        ));
    }

    proptest! {
        #[test]
        fn partitions_tile_the_column(num_rows in 1usize..5_000, worker_count in 1usize..64) {
            let got = partitions(num_rows, worker_count).unwrap();

            let expected_len = if num_rows % worker_count == 0 {
                worker_count
            } else {
                worker_count + 1
            };
            prop_assert_eq!(got.len(), expected_len);

            let mut next = 0;
            for partition in &got {
                prop_assert_eq!(partition.start, next);
                next = partition.end;
            }
            prop_assert_eq!(next, num_rows);
        }
    }
}
