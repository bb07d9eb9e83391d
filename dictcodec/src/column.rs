//! The encoded form of a string column.

use std::{sync::Arc, time::Instant};

use arrow::{
    array::{DictionaryArray, StringArray, UInt32Array},
    buffer::ScalarBuffer,
    datatypes::UInt32Type,
};
use tracing::info;

use crate::{
    Dictionary, Error, Phase, Result, partition::partitions, pool::WorkerPool,
};

/// One dictionary code per row, in the row order of the source column.
///
/// The codes live in an Arrow buffer so the vectorized scans can hand them to
/// Arrow compute kernels without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    codes: ScalarBuffer<u32>,
}

impl EncodedColumn {
    /// Encode `rows` against `dictionary`, `worker_count` partitions at a
    /// time.
    ///
    /// Fails with [`Error::EncodingMismatch`] naming the first row whose value
    /// has no code, which happens when `dictionary` was built from a
    /// different column.
    pub fn encode<S>(rows: &[S], dictionary: &Dictionary, worker_count: usize) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let pool = WorkerPool::new(Phase::Encoding, worker_count)?;
        let partitions = partitions(rows.len(), worker_count)?;

        let encoded_partitions = pool.run(&partitions, |partition| {
            rows[partition.range()]
                .iter()
                .zip(partition.range())
                .map(|(value, row)| {
                    let value = value.as_ref();
                    dictionary
                        .code(value)
                        .ok_or_else(|| Error::EncodingMismatch {
                            row,
                            value: value.to_string(),
                        })
                })
                .collect::<Result<Vec<u32>>>()
        })?;

        // partition outputs come back ordered by start offset
        let mut codes = Vec::with_capacity(rows.len());
        for partition_codes in encoded_partitions {
            codes.extend(partition_codes);
        }

        info!(
            rows = codes.len(),
            worker_count,
            elapsed = ?start.elapsed(),
            "encoded column"
        );
        Ok(Self::from(codes))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The code stored at every row.
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// The code stored at `row`.
    pub fn get(&self, row: usize) -> Option<u32> {
        self.codes.get(row).copied()
    }

    /// The codes as an Arrow array sharing this column's buffer.
    pub fn as_array(&self) -> UInt32Array {
        UInt32Array::new(self.codes.clone(), None)
    }

    /// Map every code back to its value, reproducing the source column.
    pub fn decode<'a>(&self, dictionary: &'a Dictionary) -> Result<Vec<&'a str>> {
        self.codes
            .iter()
            .enumerate()
            .map(|(row, &code)| {
                dictionary.value(code).ok_or_else(|| Error::UnknownCode {
                    row,
                    code,
                    dictionary_len: dictionary.len(),
                })
            })
            .collect()
    }

    /// The column and `dictionary` as one Arrow dictionary array.
    pub fn to_dictionary_array(
        &self,
        dictionary: &Dictionary,
    ) -> Result<DictionaryArray<UInt32Type>> {
        let values = StringArray::from_iter_values(dictionary.values());
        Ok(DictionaryArray::try_new(
            self.as_array(),
            Arc::new(values),
        )?)
    }
}

impl From<Vec<u32>> for EncodedColumn {
    fn from(codes: Vec<u32>) -> Self {
        Self {
            codes: ScalarBuffer::from(codes),
        }
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::AsArray;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reassembles_in_row_order() {
        let rows = (0..1_000).map(|i| format!("v{}", i % 37)).collect::<Vec<_>>();
        let dictionary = Dictionary::build(&rows, 3).unwrap();

        let single = EncodedColumn::encode(&rows, &dictionary, 1).unwrap();
        for worker_count in [2, 3, 7, 64, 999, 1_000, 1_001] {
            assert_eq!(
                EncodedColumn::encode(&rows, &dictionary, worker_count).unwrap(),
                single,
                "worker_count={worker_count}"
            );
        }
        assert_eq!(single.decode(&dictionary).unwrap(), rows);
    }

    #[test]
    fn mismatch_reports_lowest_row() {
        let dictionary = Dictionary::build(&["a"], 1).unwrap();
        let rows = ["a", "a", "x", "a", "y", "a"];

        let err = EncodedColumn::encode(&rows, &dictionary, 3).unwrap_err();
        assert!(
            matches!(&err, Error::EncodingMismatch { row: 2, value } if value == "x"),
            "{err}"
        );
    }

    #[test]
    fn decode_rejects_foreign_codes() {
        let dictionary = Dictionary::build(&["a", "b"], 1).unwrap();
        let column = EncodedColumn::from(vec![0, 1, 2]);
        assert!(matches!(
            column.decode(&dictionary),
            Err(Error::UnknownCode { row: 2, code: 2, dictionary_len: 2 })
        ));
    }

    #[test]
    fn accessors() {
        let column = EncodedColumn::from(vec![3, 1, 4]);
        assert_eq!(column.len(), 3);
        assert_eq!(column.get(2), Some(4));
        assert_eq!(column.get(3), None);
        assert_eq!(column.as_array().values().to_vec(), vec![3, 1, 4]);
    }

    #[test]
    fn arrow_dictionary_array() {
        let rows = ["x", "y", "x"];
        let dictionary = Dictionary::build(&rows, 1).unwrap();
        let column = EncodedColumn::encode(&rows, &dictionary, 2).unwrap();

        let array = column.to_dictionary_array(&dictionary).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.keys().values().to_vec(), vec![0, 1, 0]);

        let values = array.values().as_string::<i32>();
        assert_eq!(values.value(0), "x");
        assert_eq!(values.value(1), "y");
    }

    #[test]
    fn foreign_codes_are_rejected_by_arrow() {
        let dictionary = Dictionary::build(&["only"], 1).unwrap();
        let column = EncodedColumn::from(vec![0, 5]);
        assert!(matches!(
            column.to_dictionary_array(&dictionary),
            Err(Error::Arrow(_))
        ));
    }
}
