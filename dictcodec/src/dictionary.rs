//! The mapping between the distinct values of a column and their codes.

use std::{ops::Range, sync::Arc, time::Instant};

use hashbrown::HashMap;
use tracing::{debug, info};

use crate::{
    Error, Phase, Result,
    distinct::{distinct_values, merge_sorted},
    partition::partitions,
    pool::WorkerPool,
};

/// A bijection between the distinct values of a column and the dense code
/// space `[0, len)`.
///
/// Codes are assigned in ascending byte order of the values, so building
/// twice over the same column yields the same dictionary no matter how many
/// workers were used. Both directions of the mapping are built together and
/// the dictionary cannot be modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    // The sorted distinct values. The index of a value is its code.
    values: Vec<Arc<str>>,

    // Reverse index from value to code, sharing the allocations in `values`.
    codes: HashMap<Arc<str>, u32>,
}

impl Dictionary {
    /// Build a dictionary over `rows`, extracting distinct values from
    /// `worker_count` partitions in parallel.
    pub fn build<S>(rows: &[S], worker_count: usize) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let pool = WorkerPool::new(Phase::DistinctExtraction, worker_count)?;
        let partitions = partitions(rows.len(), worker_count)?;

        let sets = pool.run(&partitions, |partition| {
            Ok(distinct_values(&rows[partition.range()]))
        })?;
        debug!(
            partitions = partitions.len(),
            partial_distinct = sets.iter().map(|s| s.len()).sum::<usize>(),
            "merging partition distinct sets"
        );

        let dictionary = Self::from_sorted_values(merge_sorted(sets))?;
        info!(
            rows = rows.len(),
            worker_count,
            distinct = dictionary.len(),
            elapsed = ?start.elapsed(),
            "built dictionary"
        );
        Ok(dictionary)
    }

    /// Assign codes `0..n` to `values`, which must be strictly ascending.
    pub(crate) fn from_sorted_values<V>(values: impl IntoIterator<Item = V>) -> Result<Self>
    where
        V: Into<Arc<str>>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<Arc<str>>>();
        debug_assert!(
            values.windows(2).all(|w| w[0] < w[1]),
            "dictionary values must be strictly ascending"
        );

        if values.len() > u32::MAX as usize {
            return Err(Error::configuration(format!(
                "{} distinct values do not fit in 32-bit codes",
                values.len()
            )));
        }

        let codes = values
            .iter()
            .enumerate()
            .map(|(code, value)| (Arc::clone(value), code as u32))
            .collect();

        Ok(Self { values, codes })
    }

    /// The code assigned to `value`, if it occurs in the column.
    pub fn code(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// The value assigned to `code`.
    pub fn value(&self, code: u32) -> Option<&str> {
        self.values.get(code as usize).map(|v| v.as_ref())
    }

    /// Number of distinct values, which is also one past the highest code.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All `(code, value)` pairs in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(code, value)| (code as u32, value.as_ref()))
    }

    /// All values in ascending code order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.iter().map(|v| v.as_ref())
    }

    /// The codes of every value starting with `prefix`.
    ///
    /// Values sharing a prefix sit next to each other in sorted order, so the
    /// matching codes always form one contiguous, possibly empty, range.
    pub fn prefix_codes(&self, prefix: &str) -> Range<u32> {
        let lower = self.values.partition_point(|v| v.as_ref() < prefix);
        let upper = lower
            + self.values[lower..].partition_point(|v| v.starts_with(prefix));
        lower as u32..upper as u32
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        // `codes` is derived from `values`
        self.values == other.values
    }
}

impl Eq for Dictionary {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn dictionary(values: &[&str]) -> Dictionary {
        Dictionary::build(values, 1).unwrap()
    }

    #[test]
    fn codes_follow_sorted_order() {
        let dict = dictionary(&["west", "east", "north", "east", "south"]);

        assert_eq!(
            dict.iter().collect::<Vec<_>>(),
            vec![(0, "east"), (1, "north"), (2, "south"), (3, "west")]
        );
        assert_eq!(dict.code("south"), Some(2));
        assert_eq!(dict.code("up"), None);
        assert_eq!(dict.value(3), Some("west"));
        assert_eq!(dict.value(4), None);
    }

    #[test]
    fn both_directions_agree() {
        let dict = dictionary(&["b", "a,1", "", "a"]);
        for (code, value) in dict.iter() {
            assert_eq!(dict.code(value), Some(code));
            assert_eq!(dict.value(code), Some(value));
        }
    }

    #[test]
    fn prefix_codes() {
        let dict = dictionary(&["a", "ab", "abc", "b", "ba", "c"]);

        assert_eq!(dict.prefix_codes("a"), 0..3);
        assert_eq!(dict.prefix_codes("ab"), 1..3);
        assert_eq!(dict.prefix_codes("b"), 3..5);
        assert_eq!(dict.prefix_codes("c"), 5..6);
        assert_eq!(dict.prefix_codes(""), 0..6);
        assert!(dict.prefix_codes("bb").is_empty());
        assert!(dict.prefix_codes("0").is_empty());
        assert!(dict.prefix_codes("z").is_empty());
        // case-sensitive
        assert!(dict.prefix_codes("A").is_empty());
    }

    #[test]
    fn prefix_codes_empty_dictionary() {
        assert!(Dictionary::default().prefix_codes("").is_empty());
    }

    #[test]
    fn equality_ignores_construction_history() {
        let rows = ["q", "w", "e", "r", "t", "y", "q", "w"];
        assert_eq!(
            Dictionary::build(&rows, 1).unwrap(),
            Dictionary::build(&rows, 5).unwrap()
        );
        assert_ne!(dictionary(&["a"]), dictionary(&["b"]));
    }

    proptest! {
        #[test]
        fn worker_count_does_not_change_codes(
            rows in prop::collection::vec("[a-d]{0,3}", 0..200),
            w1 in 1usize..9,
            w2 in 1usize..9,
        ) {
            prop_assert_eq!(
                Dictionary::build(&rows, w1).unwrap(),
                Dictionary::build(&rows, w2).unwrap()
            );
        }

        #[test]
        fn prefix_codes_match_a_linear_filter(
            rows in prop::collection::vec("[ab]{0,4}", 0..100),
            prefix in "[ab]{0,2}",
        ) {
            let dict = Dictionary::build(&rows, 3).unwrap();
            let expected = dict
                .iter()
                .filter(|(_, v)| v.starts_with(prefix.as_str()))
                .map(|(code, _)| code)
                .collect::<Vec<_>>();
            prop_assert_eq!(dict.prefix_codes(&prefix).collect::<Vec<_>>(), expected);
        }
    }
}
