//! Converter Registration
//!
//! Populates a [`ConverterRegistry`] with the direct, indirect and array
//! scalar converters for every numeric element kind.

use std::sync::OnceLock;

use nalgebra::{DMatrix, DVector, Vector2, Vector3};
use ndarray::Array2;
use num_complex::Complex;
use numbridge_host::{ConverterRegistry, Element, ForeignType};
use tracing::debug;

use crate::config::ExposeOptions;
use crate::converter::{check_foreign, check_indirect, ArrayConverter, IndirectTarget};
use crate::matrix::{ColumnMajorMatrix, RowMajorMatrix};
use crate::scalar::register_array_scalar_converter;
use crate::vector::ArrayVector;

static REGISTRY: OnceLock<ConverterRegistry> = OnceLock::new();

/// Process-wide registry, populated with the default options on first use
pub fn registry() -> &'static ConverterRegistry {
    REGISTRY.get_or_init(|| {
        let mut registry = ConverterRegistry::new();
        expose_converters(&mut registry);
        registry
    })
}

/// Register the zero-copy converter pair for the view `V`
pub fn register_array_converter<V: ArrayConverter>(
    registry: &mut ConverterRegistry,
    options: &ExposeOptions,
) {
    let options = *options;
    let name = format!("{} {}", <V::Elem as Element>::DTYPE, V::SHAPE);

    registry.push_back::<V, _, _>(
        name.as_str(),
        move |object| check_foreign::<V>(object, &options),
        |convertible| Ok(V::from_checked(convertible.array()?)),
        Some(ForeignType::NdArray),
    );
    registry.register_to_foreign::<V, _>(name, V::to_foreign);
}

/// Register the copying converter pair for the target `R`
pub fn register_indirect_array_converter<R: IndirectTarget>(
    registry: &mut ConverterRegistry,
    options: &ExposeOptions,
) {
    let options = *options;
    let dtype = <<R::View as ArrayConverter>::Elem as Element>::DTYPE;
    let name = match R::LEN {
        Some(len) => format!("{}<{}, {}>", R::NAME, dtype, len),
        None => format!("{}<{}>", R::NAME, dtype),
    };

    registry.push_back::<R, _, _>(
        name.as_str(),
        move |object| check_indirect::<R>(object, &options),
        |convertible| {
            let view = <R::View as ArrayConverter>::from_checked(convertible.array()?);
            R::from_view(&view)
        },
        Some(ForeignType::NdArray),
    );
    registry.register_to_foreign::<R, _>(name, |value: &R| value.to_view()?.to_foreign());
}

/// Register every converter for the element kind `T`
pub fn expose_element<T: Element>(registry: &mut ConverterRegistry, options: &ExposeOptions) {
    register_array_converter::<ArrayVector<T>>(registry, options);
    register_array_converter::<RowMajorMatrix<T>>(registry, options);
    register_array_converter::<ColumnMajorMatrix<T>>(registry, options);

    if options.indirect_targets {
        register_indirect_array_converter::<DVector<T>>(registry, options);
        register_indirect_array_converter::<Vector2<T>>(registry, options);
        register_indirect_array_converter::<Vector3<T>>(registry, options);
        register_indirect_array_converter::<DMatrix<T>>(registry, options);
        register_indirect_array_converter::<Array2<T>>(registry, options);
    }

    if options.array_scalars {
        register_array_scalar_converter::<T>(registry);
    }
}

/// Register converters for all numeric kinds with the default options
pub fn expose_converters(registry: &mut ConverterRegistry) {
    expose_converters_with(registry, &ExposeOptions::default());
}

/// Register converters for all numeric kinds
pub fn expose_converters_with(registry: &mut ConverterRegistry, options: &ExposeOptions) {
    expose_element::<i8>(registry, options);
    expose_element::<u8>(registry, options);
    expose_element::<i16>(registry, options);
    expose_element::<u16>(registry, options);
    expose_element::<i32>(registry, options);
    expose_element::<u32>(registry, options);
    expose_element::<i64>(registry, options);
    expose_element::<u64>(registry, options);
    expose_element::<f32>(registry, options);
    expose_element::<f64>(registry, options);
    expose_element::<Complex<f32>>(registry, options);
    expose_element::<Complex<f64>>(registry, options);

    debug!(
        converters = registry.len(),
        targets = registry.target_count(),
        tie_break = ?options.tie_break,
        "exposed array converters"
    );
}
