//! Layout Compatibility Checks
//!
//! Decides whether a foreign array can be aliased by a native container
//! of a given element type and shape. Checks never copy, realign or
//! byte-swap: anything that would need that is rejected.
//!
//! ## Rules
//!
//! - Vector: element kind matches exactly, `ALIGNED` and `NOTSWAPPED` set.
//! - Matrix: vector rules, two dimensions, and a unit-stride dimension
//!   that matches the requested orientation. An array with unit stride
//!   in both dimensions is accepted by either orientation under the
//!   default [`ContiguityTieBreak::AcceptEither`]. Under
//!   [`ContiguityTieBreak::PreferRowMajor`] dimension 1 is tested first
//!   and such an array counts as row-major only.

use numbridge_host::{ArrayFlags, ArrayObject, BridgeError, DType, Element};
use thiserror::Error;

use crate::config::ContiguityTieBreak;
use crate::orientation::Orientation;

/// Why a checker declined a foreign object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The object is not an array
    #[error("expected an ndarray, got {type_name}")]
    NotAnArray {
        /// Runtime type name of the object
        type_name: &'static str,
    },

    /// Element kind differs from the converter's
    #[error("element kind {actual} does not match {expected}")]
    KindMismatch {
        /// Kind the converter handles
        expected: DType,
        /// Kind of the array
        actual: DType,
    },

    /// Offset or strides break the element alignment
    #[error("array data is not aligned for {dtype}")]
    Misaligned {
        /// Kind of the array
        dtype: DType,
    },

    /// Elements are not stored in machine byte order
    #[error("array data is byte-swapped")]
    ByteSwapped,

    /// Wrong number of dimensions
    #[error("expected {expected} dimensions, got {actual}")]
    Dimensionality {
        /// Required dimensionality
        expected: usize,
        /// Dimensionality of the array
        actual: usize,
    },

    /// No dimension has unit stride
    #[error("no dimension has unit stride (strides {strides:?}, item size {itemsize})")]
    NonContiguous {
        /// Byte strides of the array
        strides: Vec<isize>,
        /// Element size in bytes
        itemsize: usize,
    },

    /// Unit-stride dimension does not match the converter's orientation
    #[error("array is {actual}, expected {expected}")]
    OrientationMismatch {
        /// Orientation the converter handles
        expected: Orientation,
        /// Orientation detected from the strides
        actual: Orientation,
    },

    /// Fixed-size target with a different element count
    #[error("expected {expected} elements, got {actual}")]
    LengthMismatch {
        /// Element count of the target
        expected: usize,
        /// Element count of the array
        actual: usize,
    },
}

impl From<Rejection> for BridgeError {
    fn from(rejection: Rejection) -> Self {
        BridgeError::array_layout_incompatible(rejection.to_string())
    }
}

/// Check that `array` can back a flat vector of `T`
pub fn check_vector_layout<T: Element>(array: &ArrayObject) -> Result<(), Rejection> {
    if array.dtype() != T::DTYPE {
        return Err(Rejection::KindMismatch {
            expected: T::DTYPE,
            actual: array.dtype(),
        });
    }
    if !array.has_flags(ArrayFlags::ALIGNED) {
        return Err(Rejection::Misaligned {
            dtype: array.dtype(),
        });
    }
    if !array.has_flags(ArrayFlags::NOTSWAPPED) {
        return Err(Rejection::ByteSwapped);
    }
    Ok(())
}

/// Orientation implied by the strides of a 2-D array.
///
/// Returns `Ok(None)` when both dimensions have unit stride and the
/// tie-break accepts either orientation.
pub fn detect_orientation(
    array: &ArrayObject,
    tie_break: ContiguityTieBreak,
) -> Result<Option<Orientation>, Rejection> {
    let itemsize = array.itemsize() as isize;
    let row_contiguous = array.stride(1) == Some(itemsize);
    let column_contiguous = array.stride(0) == Some(itemsize);

    match (row_contiguous, column_contiguous) {
        (true, true) if tie_break == ContiguityTieBreak::AcceptEither => Ok(None),
        (true, _) => Ok(Some(Orientation::RowMajor)),
        (false, true) => Ok(Some(Orientation::ColumnMajor)),
        (false, false) => Err(Rejection::NonContiguous {
            strides: array.strides().to_vec(),
            itemsize: array.itemsize(),
        }),
    }
}

/// Check that `array` can back a `target`-oriented matrix of `T`
pub fn check_matrix_layout<T: Element>(
    array: &ArrayObject,
    target: Orientation,
    tie_break: ContiguityTieBreak,
) -> Result<(), Rejection> {
    check_vector_layout::<T>(array)?;
    if array.ndim() != 2 {
        return Err(Rejection::Dimensionality {
            expected: 2,
            actual: array.ndim(),
        });
    }
    match detect_orientation(array, tie_break)? {
        Some(actual) if actual != target => Err(Rejection::OrientationMismatch {
            expected: target,
            actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numbridge_host::{ArrayLayout, ArrayOrder, ByteOrder};
    use pretty_assertions::assert_eq;

    fn matrix(order: ArrayOrder, rows: usize, cols: usize) -> ArrayObject {
        ArrayObject::zeros(DType::Float64, vec![rows, cols], order).unwrap()
    }

    #[test]
    fn test_vector_accepts_matching_kind() {
        let arr = ArrayObject::zeros(DType::Int32, vec![5], ArrayOrder::C).unwrap();
        assert_eq!(check_vector_layout::<i32>(&arr), Ok(()));
        assert_eq!(
            check_vector_layout::<u32>(&arr),
            Err(Rejection::KindMismatch {
                expected: DType::UInt32,
                actual: DType::Int32
            })
        );
    }

    #[test]
    fn test_vector_rejects_byte_swapped() {
        let arr = ArrayObject::zeros(DType::Float32, vec![3], ArrayOrder::C)
            .unwrap()
            .byteswapped();
        assert_eq!(check_vector_layout::<f32>(&arr), Err(Rejection::ByteSwapped));
    }

    #[test]
    fn test_vector_rejects_misaligned() {
        let layout = ArrayLayout {
            shape: vec![2],
            strides: vec![8],
            dtype: DType::Float64,
            offset: 4,
        };
        let arr = ArrayObject::from_raw_parts(vec![0u8; 20], layout, ByteOrder::Native).unwrap();
        assert_eq!(
            check_vector_layout::<f64>(&arr),
            Err(Rejection::Misaligned {
                dtype: DType::Float64
            })
        );
    }

    #[test]
    fn test_vector_accepts_strided_and_multidimensional() {
        let arr = matrix(ArrayOrder::C, 4, 4).step(&[2, 2]).unwrap();
        assert_eq!(check_vector_layout::<f64>(&arr), Ok(()));
    }

    #[test]
    fn test_matrix_orientation_detection() {
        let tie = ContiguityTieBreak::PreferRowMajor;
        let c = matrix(ArrayOrder::C, 3, 4);
        let f = matrix(ArrayOrder::Fortran, 3, 4);

        assert_eq!(detect_orientation(&c, tie), Ok(Some(Orientation::RowMajor)));
        assert_eq!(detect_orientation(&f, tie), Ok(Some(Orientation::ColumnMajor)));

        assert_eq!(check_matrix_layout::<f64>(&c, Orientation::RowMajor, tie), Ok(()));
        assert_eq!(
            check_matrix_layout::<f64>(&c, Orientation::ColumnMajor, tie),
            Err(Rejection::OrientationMismatch {
                expected: Orientation::ColumnMajor,
                actual: Orientation::RowMajor
            })
        );
        assert_eq!(check_matrix_layout::<f64>(&f, Orientation::ColumnMajor, tie), Ok(()));
    }

    #[test]
    fn test_matrix_requires_two_dimensions() {
        let arr = ArrayObject::zeros(DType::Float64, vec![2, 2, 2], ArrayOrder::C).unwrap();
        assert_eq!(
            check_matrix_layout::<f64>(&arr, Orientation::RowMajor, ContiguityTieBreak::default()),
            Err(Rejection::Dimensionality {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_matrix_rejects_fully_strided() {
        let arr = matrix(ArrayOrder::C, 6, 6).transpose().step(&[2, 3]).unwrap();
        let tie = ContiguityTieBreak::AcceptEither;
        for target in [Orientation::RowMajor, Orientation::ColumnMajor] {
            assert!(matches!(
                check_matrix_layout::<f64>(&arr, target, tie),
                Err(Rejection::NonContiguous { .. })
            ));
        }
    }

    #[test]
    fn test_rows_with_gaps_still_row_major() {
        let arr = matrix(ArrayOrder::C, 4, 6).slice(&[0, 1], &[4, 4]).unwrap();
        assert_eq!(arr.strides(), &[48, 8]);
        assert_eq!(
            check_matrix_layout::<f64>(&arr, Orientation::RowMajor, ContiguityTieBreak::default()),
            Ok(())
        );
    }

    #[test]
    fn test_tie_break_policies() {
        // Nx1 in C order has strides (8, 8)
        let column = matrix(ArrayOrder::C, 4, 1);
        assert_eq!(column.strides(), &[8, 8]);

        let tie = ContiguityTieBreak::PreferRowMajor;
        assert_eq!(detect_orientation(&column, tie), Ok(Some(Orientation::RowMajor)));
        assert!(check_matrix_layout::<f64>(&column, Orientation::ColumnMajor, tie).is_err());

        let tie = ContiguityTieBreak::default();
        assert_eq!(tie, ContiguityTieBreak::AcceptEither);
        assert_eq!(detect_orientation(&column, tie), Ok(None));
        assert_eq!(check_matrix_layout::<f64>(&column, Orientation::ColumnMajor, tie), Ok(()));
        assert_eq!(check_matrix_layout::<f64>(&column, Orientation::RowMajor, tie), Ok(()));
    }

    #[test]
    fn test_single_row_fortran_accepted_by_default() {
        // 1xN and 0xN in Fortran order both have strides (8, 8)
        for rows in [1, 0] {
            let arr = matrix(ArrayOrder::Fortran, rows, 3);
            assert_eq!(arr.strides(), &[8, 8]);
            let tie = ContiguityTieBreak::default();
            assert_eq!(check_matrix_layout::<f64>(&arr, Orientation::ColumnMajor, tie), Ok(()));
        }
    }

    #[test]
    fn test_rejection_into_bridge_error() {
        let err: BridgeError = Rejection::ByteSwapped.into();
        assert!(err.is_layout_error());
        assert!(err.to_string().contains("byte-swapped"));
    }
}
