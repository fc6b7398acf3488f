//! Copying Targets
//!
//! Native containers that own their storage. Reading goes through a
//! checked zero-copy view and copies the elements out in one pass;
//! writing back allocates a fresh foreign array in the view's orientation.
//!
//! | Target          | View                       |
//! |-----------------|----------------------------|
//! | `DVector<T>`    | [`ArrayVector<T>`]         |
//! | `SVector<T, N>` | [`ArrayVector<T>`], size N |
//! | `DMatrix<T>`    | [`ColumnMajorMatrix<T>`]   |
//! | `Array2<T>`     | [`RowMajorMatrix<T>`]      |

use nalgebra::{DMatrix, DVector, SVector};
use ndarray::Array2;
use numbridge_host::{BridgeError, BridgeResult, Element};

use crate::converter::IndirectTarget;
use crate::matrix::{ColumnMajorMatrix, RowMajorMatrix};
use crate::vector::ArrayVector;

fn expect_copied(copied: usize, expected: usize) -> BridgeResult<()> {
    if copied == expected {
        Ok(())
    } else {
        Err(BridgeError::array_layout_incompatible(format!(
            "copied {} elements, expected {}",
            copied, expected
        )))
    }
}

impl<T: Element> IndirectTarget for DVector<T> {
    type View = ArrayVector<T>;

    const NAME: &'static str = "DVector";

    fn from_view(view: &Self::View) -> BridgeResult<Self> {
        Ok(DVector::from_vec(view.to_vec()?))
    }

    fn to_view(&self) -> BridgeResult<Self::View> {
        ArrayVector::from_slice(self.as_slice())
    }
}

impl<T: Element, const N: usize> IndirectTarget for SVector<T, N> {
    type View = ArrayVector<T>;

    const NAME: &'static str = "SVector";

    const LEN: Option<usize> = Some(N);

    fn from_view(view: &Self::View) -> BridgeResult<Self> {
        let values = view.to_vec()?;
        expect_copied(values.len(), N)?;
        Ok(Self::from_column_slice(&values))
    }

    fn to_view(&self) -> BridgeResult<Self::View> {
        ArrayVector::from_slice(self.as_slice())
    }
}

impl<T: Element> IndirectTarget for DMatrix<T> {
    type View = ColumnMajorMatrix<T>;

    const NAME: &'static str = "DMatrix";

    fn from_view(view: &Self::View) -> BridgeResult<Self> {
        let (rows, cols) = view.shape();
        let values = view.to_row_vec()?;
        expect_copied(values.len(), rows.saturating_mul(cols))?;
        Ok(DMatrix::from_row_slice(rows, cols, &values))
    }

    fn to_view(&self) -> BridgeResult<Self::View> {
        ColumnMajorMatrix::from_fn(self.nrows(), self.ncols(), |r, c| self[(r, c)])
    }
}

impl<T: Element> IndirectTarget for Array2<T> {
    type View = RowMajorMatrix<T>;

    const NAME: &'static str = "Array2";

    fn from_view(view: &Self::View) -> BridgeResult<Self> {
        Array2::from_shape_vec(view.shape(), view.to_row_vec()?)
            .map_err(|err| BridgeError::array_layout_incompatible(err.to_string()))
    }

    fn to_view(&self) -> BridgeResult<Self::View> {
        let (rows, cols) = self.dim();
        RowMajorMatrix::from_fn(rows, cols, |r, c| self[[r, c]])
    }
}
