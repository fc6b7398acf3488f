//! # numbridge convert
//!
//! Converters between foreign numeric arrays and native vector and
//! matrix types, registered into a [`ConverterRegistry`].
//!
//! ## Overview
//!
//! - Zero-copy views that alias the foreign buffer (`ArrayVector`,
//!   `ArrayMatrix` in row-major or column-major orientation)
//! - Copying targets from `nalgebra` and `ndarray` read through those views
//! - Array scalars converted to the native scalar of the same kind
//! - A registration pass covering the twelve numeric element kinds
//!
//! ## Example
//!
//! ```rust,ignore
//! use nalgebra::DMatrix;
//! use numbridge_convert::{registry, RowMajorMatrix};
//!
//! let view: RowMajorMatrix<f64> = registry().extract(&object)?;
//! let copy: DMatrix<f64> = registry().extract(&fortran_object)?;
//! let back = registry().to_foreign(&copy)?;
//! ```
//!
//! ## Module Structure
//!
//! - [`check`]: layout compatibility rules
//! - [`converter`]: the `ArrayConverter` and `IndirectTarget` traits
//! - [`vector`] / [`matrix`]: zero-copy views
//! - [`indirect`]: copying targets
//! - [`scalar`]: array scalar converters
//! - [`expose`]: registration and the process-wide registry
//! - [`config`]: registration options

pub mod check;
pub mod config;
pub mod converter;
pub mod expose;
pub mod indirect;
pub mod matrix;
pub mod orientation;
pub mod scalar;
pub mod vector;

// Re-export main types for convenience
pub use check::{check_matrix_layout, check_vector_layout, detect_orientation, Rejection};
pub use config::{ContiguityTieBreak, ExposeOptions};
pub use converter::{check_foreign, check_indirect, ArrayConverter, IndirectTarget};
pub use expose::{
    expose_converters, expose_converters_with, expose_element, register_array_converter,
    register_indirect_array_converter, registry,
};
pub use matrix::{ArrayMatrix, ColumnMajorMatrix, RowMajorMatrix};
pub use orientation::{ColumnMajor, MatrixOrientation, Orientation, RowMajor};
pub use scalar::{check_array_scalar, convert_array_scalar, register_array_scalar_converter};
pub use vector::ArrayVector;

pub use numbridge_host::{BridgeError, BridgeResult, ConverterRegistry};
