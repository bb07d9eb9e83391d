//! Per-partition distinct value extraction.

use hashbrown::HashSet;

/// The set of distinct values in `rows`.
///
/// Values are borrowed from `rows`, so extracting from a partition never
/// copies string data.
pub fn distinct_values<S>(rows: &[S]) -> HashSet<&str>
where
    S: AsRef<str>,
{
    rows.iter().map(|row| row.as_ref()).collect()
}

/// Union of several distinct sets, sorted ascending and de-duplicated.
///
/// The result depends only on the values in `sets`, never on their order or
/// on hashing.
pub fn merge_sorted<'a>(sets: impl IntoIterator<Item = HashSet<&'a str>>) -> Vec<&'a str> {
    let mut union = HashSet::new();
    for set in sets {
        union.extend(set);
    }

    let mut values = union.into_iter().collect::<Vec<_>>();
    values.sort_unstable();
    values
}
