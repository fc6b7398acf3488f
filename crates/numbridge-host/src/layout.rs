//! Strided Memory Layouts
//!
//! A foreign array describes its memory as a byte offset into a buffer
//! plus one byte stride per dimension. This module computes and
//! inspects such layouts.
//!
//! ## Memory Layout
//!
//! - C order (row-major): last dimension varies fastest
//! - Fortran order (column-major): first dimension varies fastest
//! - Anything else (sliced with a step, transposed views of sliced views)
//!   is neither

use crate::dtype::DType;
use crate::error::{BridgeError, BridgeResult};

/// Memory layout order for multi-dimensional arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOrder {
    /// C-contiguous (row-major): last dimension varies fastest
    C,
    /// Fortran-contiguous (column-major): first dimension varies fastest
    Fortran,
    /// Neither C nor Fortran contiguous
    Neither,
}

/// Complete memory layout description for an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout {
    /// Shape of the array (dimensions)
    pub shape: Vec<usize>,
    /// Strides in bytes for each dimension
    pub strides: Vec<isize>,
    /// Data type
    pub dtype: DType,
    /// Starting offset from the buffer start, in bytes
    pub offset: usize,
}

impl ArrayLayout {
    /// Create a new C-contiguous layout for the given shape and dtype
    pub fn c_contiguous(shape: Vec<usize>, dtype: DType) -> Self {
        let mut strides = Vec::with_capacity(shape.len());
        let mut stride = dtype.size() as isize;

        // Calculate strides from last to first dimension
        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride = stride.saturating_mul(dim.max(1) as isize);
        }
        strides.reverse();

        Self {
            shape,
            strides,
            dtype,
            offset: 0,
        }
    }

    /// Create a new Fortran-contiguous layout for the given shape and dtype
    pub fn fortran_contiguous(shape: Vec<usize>, dtype: DType) -> Self {
        let mut strides = Vec::with_capacity(shape.len());
        let mut stride = dtype.size() as isize;

        for &dim in shape.iter() {
            strides.push(stride);
            stride = stride.saturating_mul(dim.max(1) as isize);
        }

        Self {
            shape,
            strides,
            dtype,
            offset: 0,
        }
    }

    /// Create a dense layout in the requested order
    pub fn with_order(shape: Vec<usize>, dtype: DType, order: ArrayOrder) -> BridgeResult<Self> {
        match order {
            ArrayOrder::C => Ok(Self::c_contiguous(shape, dtype)),
            ArrayOrder::Fortran => Ok(Self::fortran_contiguous(shape, dtype)),
            ArrayOrder::Neither => Err(BridgeError::array_layout_incompatible(
                "a dense layout must be C or Fortran ordered",
            )),
        }
    }

    /// Get the number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements, saturating at `usize::MAX`
    pub fn size(&self) -> usize {
        Self::checked_size(&self.shape).unwrap_or(usize::MAX)
    }

    /// Element count of `shape`, or `None` on overflow
    ///
    /// Any zero-length dimension makes the count zero, whatever the
    /// other dimensions are.
    pub fn checked_size(shape: &[usize]) -> Option<usize> {
        if shape.contains(&0) {
            return Some(0);
        }
        shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    /// Get the total size in bytes (element count * element size)
    pub fn nbytes(&self) -> usize {
        self.size().saturating_mul(self.dtype.size())
    }

    /// Byte size of a dense array of this shape, or `None` on overflow
    pub fn checked_nbytes(shape: &[usize], dtype: DType) -> Option<usize> {
        let total = Self::checked_size(shape)?.checked_mul(dtype.size())?;
        (total <= isize::MAX as usize).then_some(total)
    }

    /// Detect the memory order from the strides
    pub fn order(&self) -> ArrayOrder {
        if self.is_c_contiguous() {
            ArrayOrder::C
        } else if self.is_fortran_contiguous() {
            ArrayOrder::Fortran
        } else {
            ArrayOrder::Neither
        }
    }

    /// Check if the layout is contiguous in either order
    pub fn is_contiguous(&self) -> bool {
        self.order() != ArrayOrder::Neither
    }

    /// Check if layout is C-contiguous
    ///
    /// Dimensions of length one never break contiguity.
    pub fn is_c_contiguous(&self) -> bool {
        self.is_dense(self.shape.iter().zip(self.strides.iter()).rev())
    }

    /// Check if layout is Fortran-contiguous
    pub fn is_fortran_contiguous(&self) -> bool {
        self.is_dense(self.shape.iter().zip(self.strides.iter()))
    }

    fn is_dense<'a>(&self, mut dims: impl Iterator<Item = (&'a usize, &'a isize)>) -> bool {
        if self.size() == 0 {
            return true;
        }
        let mut expected = self.dtype.size() as isize;
        dims.all(|(&dim, &stride)| {
            if dim == 1 {
                return true;
            }
            let ok = stride == expected;
            expected = expected.saturating_mul(dim as isize);
            ok
        })
    }

    /// Check that the offset and every stride respect the dtype alignment
    pub fn is_aligned(&self) -> bool {
        let align = self.dtype.alignment();
        self.offset % align == 0
            && self
                .strides
                .iter()
                .all(|&stride| stride.unsigned_abs() % align == 0)
    }

    /// Byte offset of the element at `indices`, or `None` when out of bounds
    pub fn byte_offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }

        if indices.iter().zip(self.shape.iter()).any(|(idx, dim)| idx >= dim) {
            return None;
        }

        let mut position = isize::try_from(self.offset).ok()?;
        for (&idx, &stride) in indices.iter().zip(self.strides.iter()) {
            let step = isize::try_from(idx).ok()?.checked_mul(stride)?;
            position = position.checked_add(step)?;
        }
        usize::try_from(position).ok()
    }

    /// Multi-index of the `flat`-th element in logical (C) order
    pub fn unravel(&self, flat: usize) -> Option<Vec<usize>> {
        if flat >= self.size() {
            return None;
        }
        let mut index = vec![0; self.ndim()];
        let mut rest = flat;
        for (slot, &dim) in index.iter_mut().zip(self.shape.iter()).rev() {
            *slot = rest % dim;
            rest /= dim;
        }
        Some(index)
    }

    /// Byte offset of the `flat`-th element in logical (C) order
    pub fn flat_byte_offset(&self, flat: usize) -> Option<usize> {
        self.unravel(flat).and_then(|index| self.byte_offset(&index))
    }

    /// Byte range `[start, end)` touched by this layout, `None` if it
    /// would reach before the start of the buffer.
    pub fn extent(&self) -> Option<(usize, usize)> {
        if self.size() == 0 {
            return Some((self.offset, self.offset));
        }
        let mut low = isize::try_from(self.offset).ok()?;
        let mut high = low;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()) {
            let span = isize::try_from(dim - 1).ok()?.checked_mul(stride)?;
            if span < 0 {
                low = low.checked_add(span)?;
            } else {
                high = high.checked_add(span)?;
            }
        }
        let start = usize::try_from(low).ok()?;
        let end = usize::try_from(high).ok()?.checked_add(self.dtype.size())?;
        Some((start, end))
    }

    /// Byte offsets of every element in logical (C) order
    pub fn element_offsets(&self) -> ElementOffsets<'_> {
        ElementOffsets {
            layout: self,
            index: vec![0; self.ndim()],
            position: isize::try_from(self.offset).ok(),
            remaining: self.size(),
        }
    }

    /// Create a view with a slice
    pub fn slice_view(&self, start: &[usize], end: &[usize]) -> BridgeResult<Self> {
        if start.len() != self.ndim() || end.len() != self.ndim() {
            return Err(BridgeError::array_layout_incompatible(
                "slice dimensions don't match array dimensions",
            ));
        }

        let mut new_shape = Vec::with_capacity(self.ndim());
        let mut new_offset = isize::try_from(self.offset).ok();

        for (((&s, &e), &stride), &dim) in start
            .iter()
            .zip(end.iter())
            .zip(self.strides.iter())
            .zip(self.shape.iter())
        {
            if s > e || e > dim {
                return Err(BridgeError::array_layout_incompatible(format!(
                    "invalid slice {}:{} for dimension of size {}",
                    s, e, dim
                )));
            }
            new_shape.push(e - s);
            if e > s {
                new_offset = new_offset.and_then(|offset| {
                    let step = isize::try_from(s).ok()?.checked_mul(stride)?;
                    offset.checked_add(step)
                });
            }
        }

        let offset = new_offset
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(|| {
                BridgeError::array_layout_incompatible("slice start lies outside the buffer")
            })?;

        Ok(Self {
            shape: new_shape,
            strides: self.strides.clone(),
            dtype: self.dtype,
            offset,
        })
    }

    /// Take every `steps[d]`-th element along each dimension
    pub fn step_view(&self, steps: &[usize]) -> BridgeResult<Self> {
        if steps.len() != self.ndim() {
            return Err(BridgeError::array_layout_incompatible(
                "step dimensions don't match array dimensions",
            ));
        }
        if steps.contains(&0) {
            return Err(BridgeError::array_layout_incompatible("step must be positive"));
        }

        let shape = self
            .shape
            .iter()
            .zip(steps.iter())
            .map(|(&dim, &step)| dim.div_ceil(step))
            .collect();
        let strides = self
            .strides
            .iter()
            .zip(steps.iter())
            .map(|(&stride, &step)| {
                isize::try_from(step)
                    .ok()
                    .and_then(|step| stride.checked_mul(step))
                    .ok_or_else(|| {
                        BridgeError::array_layout_incompatible(format!(
                            "step {} overflows stride {}",
                            step, stride
                        ))
                    })
            })
            .collect::<BridgeResult<_>>()?;

        Ok(Self {
            shape,
            strides,
            dtype: self.dtype,
            offset: self.offset,
        })
    }

    /// Transpose the array (reverse dimensions and strides)
    pub fn transpose(&self) -> Self {
        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();
        new_shape.reverse();
        new_strides.reverse();

        Self {
            shape: new_shape,
            strides: new_strides,
            dtype: self.dtype,
            offset: self.offset,
        }
    }
}

/// Iterator over element byte offsets, walking the multi-index like an
/// odometer so each step is a single stride addition.
#[derive(Debug, Clone)]
pub struct ElementOffsets<'a> {
    layout: &'a ArrayLayout,
    index: Vec<usize>,
    position: Option<isize>,
    remaining: usize,
}

impl ElementOffsets<'_> {
    fn advance(&mut self) {
        let dims = self
            .index
            .iter_mut()
            .zip(self.layout.shape.iter().zip(self.layout.strides.iter()))
            .rev();
        for (slot, (&dim, &stride)) in dims {
            *slot += 1;
            if *slot < dim {
                self.position = self.position.and_then(|p| p.checked_add(stride));
                return;
            }
            let rewind = isize::try_from(*slot - 1)
                .ok()
                .and_then(|steps| steps.checked_mul(stride));
            self.position = self
                .position
                .zip(rewind)
                .and_then(|(p, rewind)| p.checked_sub(rewind));
            *slot = 0;
        }
    }
}

impl Iterator for ElementOffsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let Some(at) = self.position.and_then(|p| usize::try_from(p).ok()) else {
            self.remaining = 0;
            return None;
        };
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(at)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
