//! Zero-Copy Matrix View
//!
//! [`ArrayMatrix`] aliases a 2-D foreign array whose unit-stride
//! dimension matches the orientation marker `O`. The other dimension may
//! have any stride, so sub-matrices cut out of a wider array are fine.

use std::fmt;
use std::marker::PhantomData;

use numbridge_host::{ArrayObject, BridgeResult, Element, ForeignObject};

use crate::check::{check_matrix_layout, Rejection};
use crate::config::ExposeOptions;
use crate::converter::ArrayConverter;
use crate::orientation::{ColumnMajor, MatrixOrientation, Orientation, RowMajor};

/// Matrix view over a 2-D foreign array.
pub struct ArrayMatrix<T: Element, O: MatrixOrientation> {
    array: ArrayObject,
    _marker: PhantomData<(T, O)>,
}

/// Row-major matrix view
pub type RowMajorMatrix<T> = ArrayMatrix<T, RowMajor>;

/// Column-major matrix view
pub type ColumnMajorMatrix<T> = ArrayMatrix<T, ColumnMajor>;

impl<T: Element, O: MatrixOrientation> ArrayMatrix<T, O> {
    fn wrap(array: ArrayObject) -> Self {
        Self {
            array,
            _marker: PhantomData,
        }
    }

    /// Alias `array` after checking its layout with the default options
    pub fn try_from_array(array: &ArrayObject) -> BridgeResult<Self> {
        Self::check_layout(array, &ExposeOptions::default())?;
        Ok(Self::wrap(array.clone()))
    }

    /// Allocate a zero-filled foreign array in this orientation
    pub fn zeros(rows: usize, cols: usize) -> BridgeResult<Self> {
        ArrayObject::zeros(T::DTYPE, vec![rows, cols], O::ORIENTATION.array_order()).map(Self::wrap)
    }

    /// Allocate a foreign array in this orientation filled from `f(row, col)`
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> BridgeResult<Self> {
        ArrayObject::from_fn(vec![rows, cols], O::ORIENTATION.array_order(), |index| {
            f(index[0], index[1])
        })
        .map(Self::wrap)
    }

    /// Allocate from values listed row by row
    pub fn from_row_slice(rows: usize, cols: usize, values: &[T]) -> BridgeResult<Self> {
        ArrayObject::from_elements(values, vec![rows, cols], O::ORIENTATION.array_order())
            .map(Self::wrap)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.array.shape().first().copied().unwrap_or(0)
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.array.shape().get(1).copied().unwrap_or(0)
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Orientation of the view
    pub fn orientation(&self) -> Orientation {
        O::ORIENTATION
    }

    /// Element at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.array.get(&[row, col]).ok()
    }

    /// Overwrite the element at `(row, col)` in the foreign buffer
    pub fn set(&mut self, row: usize, col: usize, value: T) -> BridgeResult<()> {
        self.array.set(&[row, col], value)
    }

    /// Copy the elements out row by row
    pub fn to_row_vec(&self) -> BridgeResult<Vec<T>> {
        self.array.to_vec()
    }

    /// The aliased foreign array
    pub fn array(&self) -> &ArrayObject {
        &self.array
    }

    /// Give up the view, keeping the strong reference
    pub fn into_array(self) -> ArrayObject {
        self.array
    }
}

impl<T: Element, O: MatrixOrientation> ArrayConverter for ArrayMatrix<T, O> {
    type Elem = T;

    const SHAPE: &'static str = match O::ORIENTATION {
        Orientation::RowMajor => "row-major matrix",
        Orientation::ColumnMajor => "column-major matrix",
    };

    fn check_layout(array: &ArrayObject, options: &ExposeOptions) -> Result<(), Rejection> {
        check_matrix_layout::<T>(array, O::ORIENTATION, options.tie_break)
    }

    fn from_checked(array: &ArrayObject) -> Self {
        Self::wrap(array.clone())
    }

    fn to_foreign(&self) -> BridgeResult<ForeignObject> {
        Ok(ForeignObject::Array(self.array.clone()))
    }
}

impl<T: Element, O: MatrixOrientation> Clone for ArrayMatrix<T, O> {
    fn clone(&self) -> Self {
        Self::wrap(self.array.clone())
    }
}

impl<T: Element, O: MatrixOrientation> PartialEq for ArrayMatrix<T, O> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && matches!(
                (self.to_row_vec(), other.to_row_vec()),
                (Ok(a), Ok(b)) if a == b
            )
    }
}

impl<T: Element, O: MatrixOrientation> fmt::Debug for ArrayMatrix<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayMatrix")
            .field("orientation", &O::ORIENTATION)
            .field("shape", &self.shape())
            .field("data", &self.to_row_vec().unwrap_or_default())
            .finish()
    }
}
