//! Conversion Registry
//!
//! The binding framework keeps one ordered list of rvalue converters per
//! native target type and one to-foreign converter per native source
//! type. Converting an incoming foreign value walks the list for the
//! requested type in registration order; the first checker that accepts
//! wins and its constructor builds the value.
//!
//! Registration is append-only. Nothing guards against registering the
//! same converter twice: a duplicate rvalue converter is appended after
//! the earlier one, and a duplicate to-foreign converter replaces the
//! previous one. Both cases are logged.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::array::ArrayObject;
use crate::error::{BridgeError, BridgeResult};
use crate::object::{ArrayScalar, ForeignObject, ForeignType};

/// Accepted object, handed from a checker to its constructor.
#[derive(Debug, Clone, Copy)]
pub enum Convertible<'a> {
    /// An array that passed a layout check
    Array(&'a ArrayObject),
    /// An array scalar that passed a kind check
    Scalar(&'a ArrayScalar),
}

impl<'a> Convertible<'a> {
    /// The accepted array
    pub fn array(self) -> BridgeResult<&'a ArrayObject> {
        match self {
            Convertible::Array(array) => Ok(array),
            Convertible::Scalar(scalar) => {
                Err(BridgeError::type_mismatch("ndarray", scalar.dtype().name()))
            }
        }
    }

    /// The accepted array scalar
    pub fn scalar(self) -> BridgeResult<&'a ArrayScalar> {
        match self {
            Convertible::Scalar(scalar) => Ok(scalar),
            Convertible::Array(_) => Err(BridgeError::type_mismatch("array scalar", "ndarray")),
        }
    }
}

type CheckFn = Box<dyn for<'a> Fn(&'a ForeignObject) -> Option<Convertible<'a>> + Send + Sync>;
type ConstructFn =
    Box<dyn for<'a> Fn(Convertible<'a>) -> BridgeResult<Box<dyn Any>> + Send + Sync>;
type ToForeignFn = Box<dyn Fn(&dyn Any) -> BridgeResult<ForeignObject> + Send + Sync>;

/// One foreign-to-native converter.
pub struct RvalueConverter {
    name: SmolStr,
    target_name: &'static str,
    check: CheckFn,
    construct: ConstructFn,
    foreign_hint: Option<ForeignType>,
}

impl RvalueConverter {
    /// Converter name given at registration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native target type name
    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    /// Foreign type this converter expects, if declared
    pub fn foreign_hint(&self) -> Option<ForeignType> {
        self.foreign_hint
    }

    /// Run only the checker
    pub fn check<'a>(&self, object: &'a ForeignObject) -> Option<Convertible<'a>> {
        (self.check)(object)
    }
}

impl fmt::Debug for RvalueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RvalueConverter")
            .field("name", &self.name)
            .field("target", &self.target_name)
            .field("foreign_hint", &self.foreign_hint)
            .finish()
    }
}

/// One native-to-foreign converter.
pub struct ToForeignConverter {
    name: SmolStr,
    source_name: &'static str,
    convert: ToForeignFn,
}

impl ToForeignConverter {
    /// Converter name given at registration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native source type name
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }
}

impl fmt::Debug for ToForeignConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToForeignConverter")
            .field("name", &self.name)
            .field("source", &self.source_name)
            .finish()
    }
}

/// Registry of converters between foreign objects and native types.
#[derive(Default)]
pub struct ConverterRegistry {
    rvalue: IndexMap<TypeId, Vec<RvalueConverter>>,
    to_foreign: IndexMap<TypeId, ToForeignConverter>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a foreign-to-native converter for `T`.
    ///
    /// `check` must not have side effects when it rejects. `construct`
    /// is only ever called with a value `check` accepted.
    pub fn push_back<T, C, K>(
        &mut self,
        name: impl Into<SmolStr>,
        check: C,
        construct: K,
        foreign_hint: Option<ForeignType>,
    ) where
        T: 'static,
        C: for<'a> Fn(&'a ForeignObject) -> Option<Convertible<'a>> + Send + Sync + 'static,
        K: for<'a> Fn(Convertible<'a>) -> BridgeResult<T> + Send + Sync + 'static,
    {
        let name = name.into();
        let target_name = type_name::<T>();
        let entries = self.rvalue.entry(TypeId::of::<T>()).or_default();

        if entries.iter().any(|entry| entry.name == name) {
            warn!(converter = %name, target_type = target_name, "duplicate rvalue converter registered");
        }
        debug!(converter = %name, target_type = target_name, "registered rvalue converter");

        entries.push(RvalueConverter {
            name,
            target_name,
            check: Box::new(check),
            construct: Box::new(move |convertible: Convertible<'_>| {
                construct(convertible).map(|value| Box::new(value) as Box<dyn Any>)
            }),
            foreign_hint,
        });
    }

    /// Register the native-to-foreign converter for `T`
    pub fn register_to_foreign<T, F>(&mut self, name: impl Into<SmolStr>, convert: F)
    where
        T: 'static,
        F: Fn(&T) -> BridgeResult<ForeignObject> + Send + Sync + 'static,
    {
        let name = name.into();
        let source_name = type_name::<T>();
        let convert: ToForeignFn = Box::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
            Some(value) => convert(value),
            None => Err(BridgeError::type_mismatch(source_name, "a different native type")),
        });

        debug!(converter = %name, source = source_name, "registered to-foreign converter");
        let previous = self.to_foreign.insert(
            TypeId::of::<T>(),
            ToForeignConverter {
                name,
                source_name,
                convert,
            },
        );
        if let Some(previous) = previous {
            warn!(
                replaced = %previous.name,
                source = source_name,
                "to-foreign converter replaced"
            );
        }
    }

    /// Convert a foreign object into `T` with the first accepting converter
    pub fn extract<T: 'static>(&self, object: &ForeignObject) -> BridgeResult<T> {
        let target_name = type_name::<T>();
        let entries = self
            .rvalue
            .get(&TypeId::of::<T>())
            .ok_or_else(|| BridgeError::no_converter(target_name))?;

        for entry in entries {
            let Some(convertible) = entry.check(object) else {
                trace!(converter = %entry.name, from = object.type_name(), "converter declined");
                continue;
            };
            debug!(converter = %entry.name, target_type = target_name, "converting foreign object");
            let value = (entry.construct)(convertible)?;
            return value
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| BridgeError::type_mismatch(target_name, entry.target_name));
        }

        Err(BridgeError::conversion_failed(
            object.type_name(),
            target_name,
            "no registered converter accepted the object",
        ))
    }

    /// Check whether any converter for `T` accepts the object
    pub fn is_convertible<T: 'static>(&self, object: &ForeignObject) -> bool {
        self.converters_for::<T>()
            .iter()
            .any(|entry| entry.check(object).is_some())
    }

    /// Convert a native value into a foreign object
    pub fn to_foreign<T: 'static>(&self, value: &T) -> BridgeResult<ForeignObject> {
        let converter = self
            .to_foreign
            .get(&TypeId::of::<T>())
            .ok_or_else(|| BridgeError::no_to_foreign_converter(type_name::<T>()))?;
        (converter.convert)(value)
    }

    /// Check whether a to-foreign converter exists for `T`
    pub fn has_to_foreign<T: 'static>(&self) -> bool {
        self.to_foreign.contains_key(&TypeId::of::<T>())
    }

    /// Converters registered for `T`, in registration order
    pub fn converters_for<T: 'static>(&self) -> &[RvalueConverter] {
        self.rvalue
            .get(&TypeId::of::<T>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct foreign types accepted for `T`, for signature rendering
    pub fn foreign_hints<T: 'static>(&self) -> Vec<ForeignType> {
        let mut hints: Vec<ForeignType> = Vec::new();
        for hint in self.converters_for::<T>().iter().filter_map(RvalueConverter::foreign_hint) {
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        }
        hints
    }

    /// Total number of rvalue converters
    pub fn len(&self) -> usize {
        self.rvalue.values().map(Vec::len).sum()
    }

    /// Check if no rvalue converter is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of native target types with at least one rvalue converter
    pub fn target_count(&self) -> usize {
        self.rvalue.len()
    }

    /// Number of to-foreign converters
    pub fn to_foreign_count(&self) -> usize {
        self.to_foreign.len()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("rvalue", &self.len())
            .field("targets", &self.target_count())
            .field("to_foreign", &self.to_foreign_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::layout::ArrayOrder;
    use pretty_assertions::assert_eq;

    fn accept_int(object: &ForeignObject) -> Option<Convertible<'_>> {
        object.as_scalar().filter(|s| s.dtype() == DType::Int32).map(Convertible::Scalar)
    }

    fn construct_int(convertible: Convertible<'_>) -> BridgeResult<i32> {
        convertible
            .scalar()?
            .value::<i32>()
            .ok_or_else(|| BridgeError::type_mismatch("int32", "other"))
    }

    fn accept_array(object: &ForeignObject) -> Option<Convertible<'_>> {
        object.as_array().map(Convertible::Array)
    }

    #[test]
    fn test_extract_with_first_accepting_converter() {
        let mut registry = ConverterRegistry::new();
        registry.push_back::<usize, _, _>("never", |_: &ForeignObject| None, |_| Ok(0), None);
        registry.push_back::<usize, _, _>(
            "ndim",
            accept_array,
            |c| Ok(c.array()?.ndim()),
            Some(ForeignType::NdArray),
        );
        registry.push_back::<usize, _, _>("size", accept_array, |c| Ok(c.array()?.size()), None);

        let array = ArrayObject::zeros(DType::Float64, vec![2, 3], ArrayOrder::C).unwrap();
        let object = ForeignObject::Array(array);

        assert_eq!(registry.extract::<usize>(&object), Ok(2));
        assert!(registry.is_convertible::<usize>(&object));
        assert_eq!(registry.foreign_hints::<usize>(), vec![ForeignType::NdArray]);
        assert_eq!(registry.converters_for::<usize>().len(), 3);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.target_count(), 1);
    }

    #[test]
    fn test_extract_rejected_everywhere() {
        let mut registry = ConverterRegistry::new();
        registry.push_back::<i32, _, _>("int32 scalar", accept_int, construct_int, None);

        let err = registry.extract::<i32>(&ForeignObject::Float(1.0)).unwrap_err();
        assert!(matches!(err, BridgeError::ConversionFailed { .. }));
        assert!(!registry.is_convertible::<i32>(&ForeignObject::Float(1.0)));
    }

    #[test]
    fn test_extract_without_converters() {
        let registry = ConverterRegistry::new();
        let err = registry.extract::<f64>(&ForeignObject::Float(1.0)).unwrap_err();
        assert!(matches!(err, BridgeError::NoConverter { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_construct_error_propagates() {
        let mut registry = ConverterRegistry::new();
        registry.push_back::<i32, _, _>(
            "always fails",
            accept_array,
            |_| Err(BridgeError::memory_error("out of memory")),
            None,
        );
        let array = ArrayObject::zeros(DType::Int32, vec![1], ArrayOrder::C).unwrap();
        let err = registry.extract::<i32>(&ForeignObject::Array(array)).unwrap_err();
        assert!(matches!(err, BridgeError::Memory { .. }));
    }

    #[test]
    fn test_duplicate_rvalue_registration_appends() {
        let mut registry = ConverterRegistry::new();
        registry.push_back::<i32, _, _>("int32 scalar", accept_int, construct_int, None);
        registry.push_back::<i32, _, _>("int32 scalar", accept_int, construct_int, None);

        assert_eq!(registry.converters_for::<i32>().len(), 2);
        let object = ForeignObject::Scalar(ArrayScalar::new(5i32));
        assert_eq!(registry.extract::<i32>(&object), Ok(5));
    }

    #[test]
    fn test_to_foreign_last_registration_wins() {
        let mut registry = ConverterRegistry::new();
        registry.register_to_foreign::<i32, _>("first", |v| Ok(ForeignObject::Int(i64::from(*v))));
        registry.register_to_foreign::<i32, _>("second", |v| {
            Ok(ForeignObject::Scalar(ArrayScalar::new(*v)))
        });

        assert_eq!(registry.to_foreign_count(), 1);
        assert!(registry.has_to_foreign::<i32>());
        let object = registry.to_foreign(&3i32).unwrap();
        assert_eq!(object.as_scalar().and_then(|s| s.value::<i32>()), Some(3));
    }

    #[test]
    fn test_to_foreign_missing() {
        let registry = ConverterRegistry::new();
        let err = registry.to_foreign(&1.0f64).unwrap_err();
        assert!(matches!(err, BridgeError::NoToForeignConverter { .. }));
    }
}
