//! Converter Traits
//!
//! [`ArrayConverter`] is implemented by the zero-copy views and ties a
//! layout check to a constructor and a reverse conversion.
//! [`IndirectTarget`] is implemented by plain native containers that
//! cannot alias foreign memory; they go through a view and copy.

use numbridge_host::{ArrayObject, BridgeResult, Convertible, Element, ForeignObject};
use tracing::trace;

use crate::check::Rejection;
use crate::config::ExposeOptions;

/// A native container that can alias a foreign array.
pub trait ArrayConverter: Sized + 'static {
    /// Element type of the container
    type Elem: Element;

    /// Shape name used in converter names and logs
    const SHAPE: &'static str;

    /// Decide whether `array` can back this container
    fn check_layout(array: &ArrayObject, options: &ExposeOptions) -> Result<(), Rejection>;

    /// Alias an array that passed [`check_layout`](Self::check_layout),
    /// taking a strong reference to it.
    fn from_checked(array: &ArrayObject) -> Self;

    /// Produce a foreign array sharing this container's buffer
    fn to_foreign(&self) -> BridgeResult<ForeignObject>;
}

/// A native value type filled by copying out of an [`ArrayConverter`] view.
pub trait IndirectTarget: Sized + 'static {
    /// View the data is read through
    type View: ArrayConverter;

    /// Type name used in converter names and logs
    const NAME: &'static str;

    /// Element count of fixed-size targets
    const LEN: Option<usize> = None;

    /// Extra acceptance rule on top of the view's layout check.
    ///
    /// The default rejects arrays whose size differs from [`LEN`](Self::LEN).
    fn refine(array: &ArrayObject) -> Result<(), Rejection> {
        match Self::LEN {
            Some(expected) if array.size() != expected => Err(Rejection::LengthMismatch {
                expected,
                actual: array.size(),
            }),
            _ => Ok(()),
        }
    }

    /// Copy the view's elements into a new value
    fn from_view(view: &Self::View) -> BridgeResult<Self>;

    /// Copy into a freshly allocated foreign-backed view
    fn to_view(&self) -> BridgeResult<Self::View>;
}

/// Run the layout check of `V` against an arbitrary foreign object.
///
/// Rejections are logged at trace level and reported as `None`.
pub fn check_foreign<'a, V: ArrayConverter>(
    object: &'a ForeignObject,
    options: &ExposeOptions,
) -> Option<Convertible<'a>> {
    let Some(array) = object.as_array() else {
        let rejection = Rejection::NotAnArray {
            type_name: object.type_name(),
        };
        trace!(shape = V::SHAPE, %rejection, "object rejected");
        return None;
    };

    match V::check_layout(array, options) {
        Ok(()) => Some(Convertible::Array(array)),
        Err(rejection) => {
            let dtype = <V::Elem as Element>::DTYPE;
            trace!(shape = V::SHAPE, %dtype, %rejection, "array rejected");
            None
        }
    }
}

/// Layout check of `R`'s view followed by `R`'s refinement
pub fn check_indirect<'a, R: IndirectTarget>(
    object: &'a ForeignObject,
    options: &ExposeOptions,
) -> Option<Convertible<'a>> {
    let convertible = check_foreign::<R::View>(object, options)?;
    let array = convertible.array().ok()?;
    match R::refine(array) {
        Ok(()) => Some(convertible),
        Err(rejection) => {
            trace!(target_type = R::NAME, %rejection, "array rejected");
            None
        }
    }
}
