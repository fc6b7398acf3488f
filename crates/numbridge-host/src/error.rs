//! Error Types for the Array Bridge
//!
//! This module provides the error type shared by the host object model,
//! the conversion registry, and the converters registered into it.
//!
//! ## Error Categories
//!
//! - Type conversion errors (no converter, no accepting converter)
//! - Array layout and dtype problems
//! - Memory/ownership issues (allocation overflow, read-only buffers)

use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Every converter registered for the target rejected the object
    #[error("type conversion failed: cannot convert {from_type} to {to_type}: {reason}")]
    ConversionFailed {
        /// Foreign type name
        from_type: String,
        /// Native target type name
        to_type: String,
        /// Reason for failure
        reason: String,
    },

    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type received
        actual: String,
    },

    /// No converter was ever registered for the native target type
    #[error("no converter registered for {target}")]
    NoConverter {
        /// Native target type name
        target: String,
    },

    /// No to-foreign converter registered for the native source type
    #[error("no to-foreign converter registered for {source_type}")]
    NoToForeignConverter {
        /// Native source type name
        source_type: String,
    },

    /// Array layout incompatible with the requested operation
    #[error("array layout incompatible: {reason}")]
    ArrayLayoutIncompatible {
        /// Description of the incompatibility
        reason: String,
    },

    /// Array dtype not supported
    #[error("unsupported array dtype: {dtype}")]
    UnsupportedDtype {
        /// The unsupported dtype string
        dtype: String,
    },

    /// Allocation failed in the foreign runtime
    #[error("memory error: {message}")]
    Memory {
        /// Error message
        message: String,
    },

    /// Element index outside the array bounds
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds {
        /// Requested index
        index: Vec<usize>,
        /// Shape of the array
        shape: Vec<usize>,
    },

    /// Array is not writeable
    #[error("cannot mutate read-only array: {context}")]
    ReadOnly {
        /// Context description
        context: String,
    },

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl BridgeError {
    /// Create a conversion failed error
    pub fn conversion_failed(
        from_type: impl Into<String>,
        to_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BridgeError::ConversionFailed {
            from_type: from_type.into(),
            to_type: to_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        BridgeError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a no converter error
    pub fn no_converter(target: impl Into<String>) -> Self {
        BridgeError::NoConverter {
            target: target.into(),
        }
    }

    /// Create a no to-foreign converter error
    pub fn no_to_foreign_converter(source_type: impl Into<String>) -> Self {
        BridgeError::NoToForeignConverter {
            source_type: source_type.into(),
        }
    }

    /// Create an array layout incompatible error
    pub fn array_layout_incompatible(reason: impl Into<String>) -> Self {
        BridgeError::ArrayLayoutIncompatible {
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: impl Into<String>) -> Self {
        BridgeError::UnsupportedDtype {
            dtype: dtype.into(),
        }
    }

    /// Create a memory error
    pub fn memory_error(message: impl Into<String>) -> Self {
        BridgeError::Memory {
            message: message.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: &[usize], shape: &[usize]) -> Self {
        BridgeError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        }
    }

    /// Create a read-only error
    pub fn read_only(context: impl Into<String>) -> Self {
        BridgeError::ReadOnly {
            context: context.into(),
        }
    }

    /// Create a custom error
    pub fn custom(message: impl Into<String>) -> Self {
        BridgeError::Custom(message.into())
    }

    /// Check if this is a type-related error
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            BridgeError::ConversionFailed { .. }
                | BridgeError::TypeMismatch { .. }
                | BridgeError::NoConverter { .. }
                | BridgeError::NoToForeignConverter { .. }
                | BridgeError::UnsupportedDtype { .. }
        )
    }

    /// Check if this is a layout or bounds error
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            BridgeError::ArrayLayoutIncompatible { .. } | BridgeError::IndexOutOfBounds { .. }
        )
    }
}
