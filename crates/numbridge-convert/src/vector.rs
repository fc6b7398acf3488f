//! Zero-Copy Vector View
//!
//! [`ArrayVector`] aliases the buffer of a foreign array of any
//! dimensionality and exposes its elements as a flat sequence in logical
//! (C) order. It keeps the array alive by holding a strong reference,
//! released when the view is dropped.

use std::fmt;
use std::marker::PhantomData;

use numbridge_host::{ArrayObject, ArrayOrder, BridgeResult, Element, ForeignObject};

use crate::check::{check_vector_layout, Rejection};
use crate::config::ExposeOptions;
use crate::converter::ArrayConverter;

/// Flat vector view over a foreign array.
pub struct ArrayVector<T: Element> {
    array: ArrayObject,
    _marker: PhantomData<T>,
}

impl<T: Element> ArrayVector<T> {
    fn wrap(array: ArrayObject) -> Self {
        Self {
            array,
            _marker: PhantomData,
        }
    }

    /// Alias `array` after checking its layout
    pub fn try_from_array(array: &ArrayObject) -> BridgeResult<Self> {
        check_vector_layout::<T>(array)?;
        Ok(Self::wrap(array.clone()))
    }

    /// Allocate a zero-filled 1-D foreign array
    pub fn zeros(len: usize) -> BridgeResult<Self> {
        ArrayObject::zeros(T::DTYPE, vec![len], ArrayOrder::C).map(Self::wrap)
    }

    /// Allocate a 1-D foreign array holding `values`
    pub fn from_slice(values: &[T]) -> BridgeResult<Self> {
        ArrayObject::from_elements(values, vec![values.len()], ArrayOrder::C).map(Self::wrap)
    }

    /// Allocate a 1-D foreign array filled from `f(i)`
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> T) -> BridgeResult<Self> {
        ArrayObject::from_fn(vec![len], ArrayOrder::C, |index| f(index[0])).map(Self::wrap)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.array.size()
    }

    /// Check if the vector has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at position `i`
    pub fn get(&self, i: usize) -> Option<T> {
        self.array.get_flat(i).ok()
    }

    /// Overwrite the element at position `i` in the foreign buffer
    pub fn set(&mut self, i: usize, value: T) -> BridgeResult<()> {
        self.array.set_flat(i, value)
    }

    /// Iterate over the elements
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Copy the elements out in one pass over the buffer
    pub fn to_vec(&self) -> BridgeResult<Vec<T>> {
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

impl<T: Element> ArrayConverter for ArrayVector<T> {
    type Elem = T;

    const SHAPE: &'static str = "vector";

    fn check_layout(array: &ArrayObject, _options: &ExposeOptions) -> Result<(), Rejection> {
        check_vector_layout::<T>(array)
    }

    fn from_checked(array: &ArrayObject) -> Self {
        Self::wrap(array.clone())
    }

    fn to_foreign(&self) -> BridgeResult<ForeignObject> {
        Ok(ForeignObject::Array(self.array.clone()))
    }
}

impl<T: Element> Clone for ArrayVector<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.array.clone())
    }
}

impl<T: Element> PartialEq for ArrayVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.array.shape() == other.array.shape() && self.iter().eq(other.iter())
    }
}

impl<T: Element> fmt::Debug for ArrayVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numbridge_host::DType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vector_aliases_foreign_buffer() {
        let arr = ArrayObject::from_elements(&[1.0f64, 2.0, 3.0], vec![3], ArrayOrder::C).unwrap();
        let mut view = ArrayVector::<f64>::try_from_array(&arr).unwrap();

        assert_eq!(view.len(), 3);
        assert_eq!(view.get(1), Some(2.0));
        assert_eq!(view.get(3), None);

        view.set(1, 20.0).unwrap();
        assert_eq!(arr.get::<f64>(&[1]).unwrap(), 20.0);
    }

    #[test]
    fn test_vector_holds_strong_reference() {
        let arr = ArrayObject::zeros(DType::Int64, vec![4], ArrayOrder::C).unwrap();
        let weak = arr.downgrade();
        let before = arr.ref_count();

        let view = ArrayVector::<i64>::try_from_array(&arr).unwrap();
        assert_eq!(arr.ref_count(), before + 1);

        drop(arr);
        assert!(weak.is_alive());
        assert_eq!(view.len(), 4);

        drop(view);
        assert!(!weak.is_alive());
    }

    #[test]
    fn test_vector_flattens_strided_arrays() {
        let values: Vec<i32> = (0..12).collect();
        let arr = ArrayObject::from_elements(&values, vec![3, 4], ArrayOrder::Fortran).unwrap();
        let view = ArrayVector::<i32>::try_from_array(&arr.transpose()).unwrap();

        assert_eq!(view.to_vec().unwrap(), vec![0, 4, 8, 1, 5, 9, 2, 6, 10, 3, 7, 11]);
    }

    #[test]
    fn test_vector_wrong_kind_is_layout_error() {
        let arr = ArrayObject::zeros(DType::Float32, vec![2], ArrayOrder::C).unwrap();
        let err = ArrayVector::<f64>::try_from_array(&arr).unwrap_err();
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_vector_to_foreign_shares_buffer() {
        let view = ArrayVector::from_slice(&[1u8, 2, 3]).unwrap();
        let foreign = view.to_foreign().unwrap();
        let arr = foreign.as_array().unwrap();

        assert!(arr.buffer().same_memory(view.array().buffer()));
        assert_eq!(arr.shape(), &[3]);
        assert_eq!(arr.to_vec::<u8>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_vector_to_foreign_returns_aliased_object() {
        let arr = ArrayObject::from_elements(&[4i32, 5, 6], vec![3], ArrayOrder::C).unwrap();
        let view = ArrayVector::<i32>::try_from_array(&arr).unwrap();
        let before = arr.ref_count();

        let foreign = view.to_foreign().unwrap();
        let back = foreign.as_array().unwrap();
        assert!(back.same_object(&arr));
        assert_eq!(arr.ref_count(), before + 1);

        drop(foreign);
        assert_eq!(arr.ref_count(), before);
    }

    #[test]
    fn test_vector_from_fn() {
        let view = ArrayVector::from_fn(4, |i| (i * i) as u16).unwrap();
        assert_eq!(view.to_vec().unwrap(), vec![0, 1, 4, 9]);
        assert!(ArrayVector::<u16>::zeros(0).unwrap().is_empty());
    }
}
