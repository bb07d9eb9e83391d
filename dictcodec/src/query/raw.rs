//! The unencoded baseline: queries answered straight from the source strings.

use crate::Result;

use super::{PrefixMatches, StringQuery};

/// Queries answered by comparing every row of the unencoded column.
#[derive(Debug, Clone, Copy)]
pub struct RawScan<'a, S> {
    rows: &'a [S],
}

impl<'a, S: AsRef<str>> RawScan<'a, S> {
    pub fn new(rows: &'a [S]) -> Self {
        Self { rows }
    }
}

impl<S: AsRef<str>> StringQuery for RawScan<'_, S> {
    fn exact(&self, needle: &str) -> Result<Vec<usize>> {
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.as_ref() == needle)
            .map(|(position, _)| position)
            .collect())
    }

    fn prefix(&self, prefix: &str) -> Result<PrefixMatches<'_>> {
        let mut matches = PrefixMatches::new();
        for (position, row) in self.rows.iter().enumerate() {
            let row = row.as_ref();
            if row.starts_with(prefix) {
                matches.entry(row).or_default().push(position);
            }
        }
        Ok(matches)
    }
}
