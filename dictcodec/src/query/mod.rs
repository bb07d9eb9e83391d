//! Exact-match and prefix queries over a string column.
//!
//! [`DictionaryQuery`] answers queries on the encoded form by translating the
//! query string into dictionary codes once, then scanning integer codes.
//! [`RawScan`] answers the same queries by comparing every source string and
//! is kept as the baseline the encoded path is measured against.

use std::collections::BTreeMap;

use crate::{Dictionary, EncodedColumn, Result};

mod raw;
mod scan;

pub use raw::RawScan;
pub use scan::ScanStrategy;

/// The rows of every distinct value that matched a prefix query, keyed and
/// iterated in ascending value order. Each row list is ascending and values
/// that occur in no row are absent.
pub type PrefixMatches<'a> = BTreeMap<&'a str, Vec<usize>>;

/// A source of answers to string queries.
pub trait StringQuery {
    /// Ascending positions of the rows equal to `needle`.
    fn exact(&self, needle: &str) -> Result<Vec<usize>>;

    /// Positions of the rows holding each distinct value that starts with
    /// `prefix`.
    fn prefix(&self, prefix: &str) -> Result<PrefixMatches<'_>>;
}

/// Queries answered from a [`Dictionary`] and its [`EncodedColumn`].
#[derive(Debug, Clone, Copy)]
pub struct DictionaryQuery<'a> {
    dictionary: &'a Dictionary,
    column: &'a EncodedColumn,
    scan: ScanStrategy,
}

impl<'a> DictionaryQuery<'a> {
    pub fn new(dictionary: &'a Dictionary, column: &'a EncodedColumn) -> Self {
        Self {
            dictionary,
            column,
            scan: ScanStrategy::default(),
        }
    }

    pub fn with_strategy(self, scan: ScanStrategy) -> Self {
        Self { scan, ..self }
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.scan
    }

    /// Ascending positions of the rows equal to `needle`. A value missing from
    /// the dictionary matches nothing.
    pub fn exact(&self, needle: &str) -> Result<Vec<usize>> {
        match self.dictionary.code(needle) {
            Some(code) => self.scan.positions_eq(self.column, code),
            None => Ok(vec![]),
        }
    }

    /// Positions of the rows holding each distinct value that starts with
    /// `prefix`.
    ///
    /// Values sharing a prefix are adjacent in the dictionary, so the whole
    /// query is a single scan for one contiguous range of codes.
    pub fn prefix(&self, prefix: &str) -> Result<PrefixMatches<'a>> {
        let codes = self.dictionary.prefix_codes(prefix);
        if codes.is_empty() {
            return Ok(PrefixMatches::new());
        }

        let column_codes = self.column.codes();
        let mut buckets = vec![Vec::new(); codes.len()];
        for row in self.scan.positions_in(self.column, codes.clone())? {
            buckets[(column_codes[row] - codes.start) as usize].push(row);
        }

        Ok(self
            .dictionary
            .values()
            .skip(codes.start as usize)
            .zip(buckets)
            .filter(|(_, rows)| !rows.is_empty())
            .collect())
    }
}

impl StringQuery for DictionaryQuery<'_> {
    fn exact(&self, needle: &str) -> Result<Vec<usize>> {
        Self::exact(self, needle)
    }

    fn prefix(&self, prefix: &str) -> Result<PrefixMatches<'_>> {
        Self::prefix(self, prefix)
    }
}
