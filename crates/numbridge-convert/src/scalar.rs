//! Array Scalar Converters
//!
//! Zero-dimensional foreign values carry an element kind of their own.
//! They convert to the native scalar of exactly that kind and nothing
//! else: no widening, no narrowing.

use numbridge_host::{
    BridgeError, BridgeResult, ConverterRegistry, Convertible, Element, ForeignObject,
    ForeignType,
};
use tracing::trace;

/// Accept `object` if it is an array scalar of kind `T`
pub fn check_array_scalar<T: Element>(object: &ForeignObject) -> Option<Convertible<'_>> {
    let scalar = object.as_scalar()?;
    if scalar.dtype() == T::DTYPE {
        Some(Convertible::Scalar(scalar))
    } else {
        let (expected, actual) = (T::DTYPE, scalar.dtype());
        trace!(%expected, %actual, "array scalar rejected");
        None
    }
}

/// Read the value out of a scalar accepted by [`check_array_scalar`]
pub fn convert_array_scalar<T: Element>(convertible: Convertible<'_>) -> BridgeResult<T> {
    let scalar = convertible.scalar()?;
    scalar
        .value::<T>()
        .ok_or_else(|| BridgeError::type_mismatch(T::DTYPE.name(), scalar.dtype().name()))
}

/// Register the array scalar converter for `T`
pub fn register_array_scalar_converter<T: Element>(registry: &mut ConverterRegistry) {
    registry.push_back::<T, _, _>(
        format!("array scalar {}", T::DTYPE),
        check_array_scalar::<T>,
        convert_array_scalar::<T>,
        Some(ForeignType::ArrayScalar(T::DTYPE)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use numbridge_host::{ArrayOrder, ArrayObject, ArrayScalar, DType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_accepts_exact_kind_only() {
        let object = ForeignObject::Scalar(ArrayScalar::new(7i16));
        assert!(check_array_scalar::<i16>(&object).is_some());
        assert!(check_array_scalar::<i32>(&object).is_none());
        assert!(check_array_scalar::<u16>(&object).is_none());
    }

    #[test]
    fn test_scalar_rejects_other_objects() {
        let array = ArrayObject::zeros(DType::Float64, vec![1], ArrayOrder::C).unwrap();
        assert!(check_array_scalar::<f64>(&ForeignObject::Array(array)).is_none());
        assert!(check_array_scalar::<f64>(&ForeignObject::Float(1.0)).is_none());
    }

    #[test]
    fn test_scalar_through_registry() {
        let mut registry = ConverterRegistry::new();
        register_array_scalar_converter::<f32>(&mut registry);

        let object = ForeignObject::Scalar(ArrayScalar::new(2.5f32));
        assert_eq!(registry.extract::<f32>(&object).unwrap(), 2.5);
        assert_eq!(
            registry.foreign_hints::<f32>(),
            vec![ForeignType::ArrayScalar(DType::Float32)]
        );

        let wrong = ForeignObject::Scalar(ArrayScalar::new(2.5f64));
        assert!(registry.extract::<f32>(&wrong).is_err());
    }
}
