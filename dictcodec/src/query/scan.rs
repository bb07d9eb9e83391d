//! Finding the rows of an [`EncodedColumn`] that hold given codes.

use std::ops::Range;

use arrow::{
    array::UInt32Array,
    compute::kernels::{boolean::and, cmp},
};

use crate::{EncodedColumn, Result};

/// How an [`EncodedColumn`] is scanned for matching codes.
///
/// Both strategies return the same positions in the same ascending order;
/// they differ only in speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Compare one code at a time.
    Scalar,

    /// Compare the whole column with Arrow's SIMD comparison kernels, then
    /// walk the set bits of the resulting mask.
    #[default]
    Vectorized,
}

impl ScanStrategy {
    /// Ascending positions of the rows holding `code`.
    pub fn positions_eq(&self, column: &EncodedColumn, code: u32) -> Result<Vec<usize>> {
        match self {
            Self::Scalar => Ok(column
                .codes()
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == code)
                .map(|(row, _)| row)
                .collect()),
            Self::Vectorized => {
                let mask = cmp::eq(&column.as_array(), &UInt32Array::new_scalar(code))?;
                Ok(mask.values().set_indices().collect())
            }
        }
    }

    /// Ascending positions of the rows holding any code in `codes`.
    pub fn positions_in(&self, column: &EncodedColumn, codes: Range<u32>) -> Result<Vec<usize>> {
        if codes.is_empty() {
            return Ok(vec![]);
        }
        if codes.len() == 1 {
            return self.positions_eq(column, codes.start);
        }

        match self {
            Self::Scalar => Ok(column
                .codes()
                .iter()
                .enumerate()
                .filter(|(_, c)| codes.contains(c))
                .map(|(row, _)| row)
                .collect()),
            Self::Vectorized => {
                let array = column.as_array();
                let lower = cmp::gt_eq(&array, &UInt32Array::new_scalar(codes.start))?;
                let upper = cmp::lt(&array, &UInt32Array::new_scalar(codes.end))?;
                let mask = and(&lower, &upper)?;
                Ok(mask.values().set_indices().collect())
            }
        }
    }
}
