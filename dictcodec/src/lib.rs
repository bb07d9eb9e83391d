//! Dictionary encoding for string columns.
//!
//! A column of strings is replaced by a [`Dictionary`] mapping every distinct
//! value to a dense `u32` code, and an [`EncodedColumn`] holding one code per
//! row. Both are built in parallel over contiguous row partitions, can be
//! persisted to a pair of line-oriented files, and answer exact-match and
//! prefix queries by scanning codes instead of strings.
//!
//! ```
//! let rows = ["a", "b", "a", "c", "ab"];
//! let dictionary = dictcodec::build_dictionary(&rows, 2).unwrap();
//! let encoded = dictcodec::encode(&rows, &dictionary, 2).unwrap();
//!
//! assert_eq!(encoded.codes(), &[0, 2, 0, 3, 1]);
//! assert_eq!(
//!     dictcodec::query_exact(&encoded, &dictionary, "a").unwrap(),
//!     vec![0, 2]
//! );
//! ```

use std::path::{Path, PathBuf};

use arrow::error::ArrowError;

pub mod column;
pub mod dictionary;
pub mod distinct;
pub mod partition;
mod pool;
pub mod query;
pub mod store;

pub use column::EncodedColumn;
pub use dictionary::Dictionary;
pub use partition::Partition;
pub use pool::Phase;
pub use query::{DictionaryQuery, PrefixMatches, RawScan, ScanStrategy, StringQuery};
pub use store::FormatErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("value {value:?} at row {row} has no entry in the dictionary")]
    EncodingMismatch { row: usize, value: String },

    #[error("code {code} at row {row} is outside a dictionary of {dictionary_len} values")]
    UnknownCode {
        row: usize,
        code: u32,
        dictionary_len: usize,
    },

    #[error("{failed} of {total} {phase} tasks failed: {reason}")]
    Build {
        phase: Phase,
        failed: usize,
        total: usize,
        reason: String,
    },

    #[error("malformed record in {} at line {line}: {kind}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        kind: FormatErrorKind,
    },

    #[error("dictionary value for code {code} contains a line break and cannot be persisted")]
    Unpersistable { code: u32 },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl Error {
    fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Build a [`Dictionary`] over `rows` using `worker_count` parallel workers.
///
/// The result does not depend on `worker_count`: codes are assigned in
/// ascending lexical order of the distinct values.
pub fn build_dictionary<S>(rows: &[S], worker_count: usize) -> Result<Dictionary>
where
    S: AsRef<str> + Sync,
{
    Dictionary::build(rows, worker_count)
}

/// Encode `rows` against `dictionary` using `worker_count` parallel workers.
pub fn encode<S>(rows: &[S], dictionary: &Dictionary, worker_count: usize) -> Result<EncodedColumn>
where
    S: AsRef<str> + Sync,
{
    EncodedColumn::encode(rows, dictionary, worker_count)
}

/// Write `dictionary` to `dict_path` and `encoded` to `data_path`.
pub fn persist(
    dictionary: &Dictionary,
    encoded: &EncodedColumn,
    dict_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
) -> Result<()> {
    store::persist(dictionary, encoded, dict_path.as_ref(), data_path.as_ref())
}

/// Read back a pair written by [`persist`].
pub fn load(
    dict_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
) -> Result<(Dictionary, EncodedColumn)> {
    store::load(dict_path.as_ref(), data_path.as_ref())
}

/// Ascending row positions whose value equals `needle`.
pub fn query_exact(
    encoded: &EncodedColumn,
    dictionary: &Dictionary,
    needle: &str,
) -> Result<Vec<usize>> {
    DictionaryQuery::new(dictionary, encoded).exact(needle)
}

/// Row positions of every distinct value starting with `prefix`.
pub fn query_prefix<'a>(
    dictionary: &'a Dictionary,
    encoded: &'a EncodedColumn,
    prefix: &str,
) -> Result<PrefixMatches<'a>> {
    DictionaryQuery::new(dictionary, encoded).prefix(prefix)
}
