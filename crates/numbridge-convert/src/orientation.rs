//! Matrix Orientation
//!
//! Orientation is fixed per converter at compile time through the
//! [`RowMajor`] and [`ColumnMajor`] marker types.

use std::fmt;

use numbridge_host::ArrayOrder;

/// Which dimension of a 2-D container has unit stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Dimension 1 is contiguous (rows are laid out one after another)
    RowMajor,
    /// Dimension 0 is contiguous (columns are laid out one after another)
    ColumnMajor,
}

impl Orientation {
    /// Index of the unit-stride dimension
    pub fn contiguous_dim(self) -> usize {
        match self {
            Orientation::RowMajor => 1,
            Orientation::ColumnMajor => 0,
        }
    }

    /// Dense array order used when allocating a matrix of this orientation
    pub fn array_order(self) -> ArrayOrder {
        match self {
            Orientation::RowMajor => ArrayOrder::C,
            Orientation::ColumnMajor => ArrayOrder::Fortran,
        }
    }

    /// Short name
    pub fn name(self) -> &'static str {
        match self {
            Orientation::RowMajor => "row-major",
            Orientation::ColumnMajor => "column-major",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compile-time orientation marker.
pub trait MatrixOrientation: fmt::Debug + Send + Sync + 'static {
    /// The orientation this marker stands for
    const ORIENTATION: Orientation;
}

/// Row-major marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowMajor;

/// Column-major marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnMajor;

impl MatrixOrientation for RowMajor {
    const ORIENTATION: Orientation = Orientation::RowMajor;
}

impl MatrixOrientation for ColumnMajor {
    const ORIENTATION: Orientation = Orientation::ColumnMajor;
}
