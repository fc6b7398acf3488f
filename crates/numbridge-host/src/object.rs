//! Foreign Object Values
//!
//! [`ForeignObject`] is the dynamically typed value the scripting runtime
//! hands to the binding framework. Converters inspect it through
//! [`ForeignObject::as_array`] and [`ForeignObject::as_scalar`] and reject
//! everything else.

use std::fmt;

use smol_str::SmolStr;

use crate::array::ArrayObject;
use crate::dtype::{DType, Element};

// ============================================================================
// ArrayScalar - Zero-Dimensional Typed Values
// ============================================================================

/// A zero-dimensional value tagged with an element kind.
#[derive(Clone, PartialEq, Eq)]
pub struct ArrayScalar {
    dtype: DType,
    bytes: Vec<u8>,
}

impl ArrayScalar {
    /// Box a native value
    pub fn new<T: Element>(value: T) -> Self {
        let mut bytes = vec![0u8; T::DTYPE.size()];
        value.write_ne_slice(&mut bytes);
        Self {
            dtype: T::DTYPE,
            bytes,
        }
    }

    /// Element kind of the scalar
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Read the value as `T`, `None` unless the kinds match exactly
    pub fn value<T: Element>(&self) -> Option<T> {
        (self.dtype == T::DTYPE).then(|| T::from_ne_slice(&self.bytes))
    }
}

impl fmt::Debug for ArrayScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayScalar({})", self.dtype)
    }
}

// ============================================================================
// ForeignType - Type Hints for Signatures
// ============================================================================

/// Foreign type a converter expects, used for signature documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignType {
    /// The runtime's n-dimensional array type
    NdArray,
    /// The array scalar type of one element kind
    ArrayScalar(DType),
}

impl fmt::Display for ForeignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignType::NdArray => write!(f, "ndarray"),
            ForeignType::ArrayScalar(dtype) => write!(f, "{}", dtype),
        }
    }
}

// ============================================================================
// ForeignObject - Any Runtime Value
// ============================================================================

/// Any value owned by the scripting runtime.
#[derive(Debug, Clone)]
pub enum ForeignObject {
    /// `None`
    None,

    /// Builtin integer
    Int(i64),

    /// Builtin float
    Float(f64),

    /// Builtin string
    Str(SmolStr),

    /// Builtin list
    List(Vec<ForeignObject>),

    /// N-dimensional array
    Array(ArrayObject),

    /// Array scalar
    Scalar(ArrayScalar),
}

impl ForeignObject {
    /// Get the runtime type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            ForeignObject::None => "NoneType",
            ForeignObject::Int(_) => "int",
            ForeignObject::Float(_) => "float",
            ForeignObject::Str(_) => "str",
            ForeignObject::List(_) => "list",
            ForeignObject::Array(_) => "ndarray",
            ForeignObject::Scalar(scalar) => scalar.dtype().name(),
        }
    }

    /// Check if this value is None
    pub fn is_none(&self) -> bool {
        matches!(self, ForeignObject::None)
    }

    /// "Is this an array" check of the object protocol
    pub fn as_array(&self) -> Option<&ArrayObject> {
        match self {
            ForeignObject::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Try to extract as an array scalar
    pub fn as_scalar(&self) -> Option<&ArrayScalar> {
        match self {
            ForeignObject::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Consume into the array handle, if this is an array
    pub fn into_array(self) -> Option<ArrayObject> {
        match self {
            ForeignObject::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<ArrayObject> for ForeignObject {
    fn from(array: ArrayObject) -> Self {
        ForeignObject::Array(array)
    }
}

impl From<ArrayScalar> for ForeignObject {
    fn from(scalar: ArrayScalar) -> Self {
        ForeignObject::Scalar(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ArrayOrder;
    use num_complex::Complex;

    #[test]
    fn test_scalar_value_requires_exact_kind() {
        let scalar = ArrayScalar::new(7u16);
        assert_eq!(scalar.dtype(), DType::UInt16);
        assert_eq!(scalar.value::<u16>(), Some(7));
        assert_eq!(scalar.value::<i16>(), None);
        assert_eq!(scalar.value::<u32>(), None);
    }

    #[test]
    fn test_complex_scalar() {
        let scalar = ArrayScalar::new(Complex::new(0.5f64, 4.0));
        assert_eq!(scalar.value::<Complex<f64>>(), Some(Complex::new(0.5, 4.0)));
    }

    #[test]
    fn test_type_names() {
        let arr = ArrayObject::zeros(DType::Int8, vec![1], ArrayOrder::C).unwrap();
        assert_eq!(ForeignObject::from(arr).type_name(), "ndarray");
        assert_eq!(ForeignObject::from(ArrayScalar::new(1.0f32)).type_name(), "float32");
        assert_eq!(ForeignObject::Str("x".into()).type_name(), "str");
        assert!(ForeignObject::None.is_none());
    }

    #[test]
    fn test_as_array() {
        let arr = ArrayObject::zeros(DType::Int8, vec![1], ArrayOrder::C).unwrap();
        let obj = ForeignObject::from(arr.clone());
        assert!(obj.as_array().is_some_and(|a| a.same_object(&arr)));
        assert!(obj.as_scalar().is_none());
        assert!(ForeignObject::Int(3).as_array().is_none());
    }
}
