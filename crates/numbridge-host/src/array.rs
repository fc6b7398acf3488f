//! Foreign Array Objects
//!
//! [`ArrayObject`] is the runtime-managed, reference-counted array the
//! converters operate on. Cloning a handle increments the object's
//! reference count and dropping it decrements the count, so a native
//! container that aliases the buffer keeps the object alive simply by
//! holding a clone.
//!
//! ## Ownership
//!
//! - `ArrayObject` is a strong hold (shares ownership)
//! - `&ArrayObject` is a borrowed hold for the duration of a call
//! - [`WeakArray`] observes an object without keeping it alive
//!
//! Views (slices, transposes, steps, byte-order changes that share data)
//! keep their base object alive the same way.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use bitflags::bitflags;
use parking_lot::RwLock;

use crate::dtype::{swap_element_bytes, ByteOrder, DType, Element};
use crate::error::{BridgeError, BridgeResult};
use crate::layout::{ArrayLayout, ArrayOrder};

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

bitflags! {
    /// Array flag set, mirroring the foreign runtime's array flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArrayFlags: u32 {
        /// Data is C-contiguous
        const C_CONTIGUOUS = 0x0001;
        /// Data is Fortran-contiguous
        const F_CONTIGUOUS = 0x0002;
        /// Offset and strides respect the element alignment
        const ALIGNED = 0x0100;
        /// Data may be written through this object
        const WRITEABLE = 0x0400;
        /// Elements are stored in machine byte order
        const NOTSWAPPED = 0x0200;
    }
}

impl ArrayFlags {
    fn compute(layout: &ArrayLayout, byte_order: ByteOrder, writeable: bool) -> Self {
        let mut flags = ArrayFlags::empty();
        flags.set(ArrayFlags::C_CONTIGUOUS, layout.is_c_contiguous());
        flags.set(ArrayFlags::F_CONTIGUOUS, layout.is_fortran_contiguous());
        flags.set(ArrayFlags::ALIGNED, layout.is_aligned());
        flags.set(ArrayFlags::NOTSWAPPED, byte_order == ByteOrder::Native);
        flags.set(ArrayFlags::WRITEABLE, writeable);
        flags
    }
}

// ============================================================================
// ArrayBuffer - Shared Data Storage
// ============================================================================

/// Raw data bytes shared by an array and all of its views.
#[derive(Clone)]
pub struct ArrayBuffer {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl ArrayBuffer {
    fn zeroed(len: usize) -> Self {
        Self::from_bytes(vec![0; len])
    }

    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(RwLock::new(bytes)),
        }
    }

    /// Size of the buffer in bytes
    pub fn len(&self) -> usize {
        self.bytes.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two handles refer to the same memory
    pub fn same_memory(&self, other: &ArrayBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Run `f` with read access to the raw bytes
    pub fn read<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        f(&self.bytes.read())
    }

    /// Run `f` with write access to the raw bytes
    pub fn write<T>(&self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        f(&mut self.bytes.write())
    }
}

impl fmt::Debug for ArrayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayBuffer({} bytes)", self.len())
    }
}

// ============================================================================
// ArrayObject - Reference-Counted Foreign Array
// ============================================================================

#[derive(Debug)]
struct ArrayInner {
    id: u64,
    layout: ArrayLayout,
    byte_order: ByteOrder,
    flags: ArrayFlags,
    buffer: ArrayBuffer,
    base: Option<ArrayObject>,
}

/// Strong handle to a foreign array object.
#[derive(Clone)]
pub struct ArrayObject {
    inner: Arc<ArrayInner>,
}

/// Non-owning handle to a foreign array object.
#[derive(Debug, Clone)]
pub struct WeakArray {
    inner: Weak<ArrayInner>,
}

impl WeakArray {
    /// Regain a strong handle if the object is still alive
    pub fn upgrade(&self) -> Option<ArrayObject> {
        self.inner.upgrade().map(|inner| ArrayObject { inner })
    }

    /// Whether the object is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl ArrayObject {
    fn build(
        layout: ArrayLayout,
        buffer: ArrayBuffer,
        byte_order: ByteOrder,
        writeable: bool,
        base: Option<ArrayObject>,
    ) -> Self {
        let flags = ArrayFlags::compute(&layout, byte_order, writeable);
        Self {
            inner: Arc::new(ArrayInner {
                id: NEXT_ARRAY_ID.fetch_add(1, Ordering::Relaxed),
                layout,
                byte_order,
                flags,
                buffer,
                base,
            }),
        }
    }

    /// Allocate a new zero-initialized dense array
    pub fn zeros(dtype: DType, shape: Vec<usize>, order: ArrayOrder) -> BridgeResult<Self> {
        let nbytes = ArrayLayout::checked_nbytes(&shape, dtype).ok_or_else(|| {
            BridgeError::memory_error(format!(
                "cannot allocate {} array of shape {:?}",
                dtype, shape
            ))
        })?;
        let layout = ArrayLayout::with_order(shape, dtype, order)?;
        Ok(Self::build(
            layout,
            ArrayBuffer::zeroed(nbytes),
            ByteOrder::Native,
            true,
            None,
        ))
    }

    /// Allocate a new zero-initialized array with explicit byte strides
    pub fn allocate(dtype: DType, shape: Vec<usize>, strides: Vec<isize>) -> BridgeResult<Self> {
        if shape.len() != strides.len() {
            return Err(BridgeError::array_layout_incompatible(format!(
                "{} strides given for {} dimensions",
                strides.len(),
                shape.len()
            )));
        }
        if strides.iter().any(|&stride| stride < 0) {
            return Err(BridgeError::array_layout_incompatible(
                "cannot allocate an array with negative strides",
            ));
        }
        let layout = ArrayLayout {
            shape,
            strides,
            dtype,
            offset: 0,
        };
        let (_, end) = layout.extent().ok_or_else(|| {
            BridgeError::memory_error(format!(
                "cannot allocate {} array of shape {:?}",
                dtype, layout.shape
            ))
        })?;
        Ok(Self::build(
            layout,
            ArrayBuffer::zeroed(end),
            ByteOrder::Native,
            true,
            None,
        ))
    }

    /// Allocate a dense array and fill it from `f(index)` for every index
    pub fn from_fn<T: Element>(
        shape: Vec<usize>,
        order: ArrayOrder,
        mut f: impl FnMut(&[usize]) -> T,
    ) -> BridgeResult<Self> {
        let array = Self::zeros(T::DTYPE, shape, order)?;
        let layout = array.layout();
        let item = T::DTYPE.size();
        let mut index = vec![0; layout.ndim()];
        array.inner.buffer.write(|bytes| {
            for at in layout.element_offsets() {
                f(&index).write_ne_slice(&mut bytes[at..at + item]);
                for (slot, &dim) in index.iter_mut().zip(layout.shape.iter()).rev() {
                    *slot += 1;
                    if *slot < dim {
                        break;
                    }
                    *slot = 0;
                }
            }
        });
        Ok(array)
    }

    /// Allocate a dense array from values listed in logical (C) order
    pub fn from_elements<T: Element>(
        values: &[T],
        shape: Vec<usize>,
        order: ArrayOrder,
    ) -> BridgeResult<Self> {
        let expected = ArrayLayout::checked_size(&shape).ok_or_else(|| {
            BridgeError::memory_error(format!("element count of shape {:?} overflows", shape))
        })?;
        if values.len() != expected {
            return Err(BridgeError::array_layout_incompatible(format!(
                "{} values don't fill shape {:?}",
                values.len(),
                shape
            )));
        }
        let mut next = values.iter().copied();
        Self::from_fn(shape, order, |_| next.next().unwrap_or_default())
    }

    /// Wrap existing bytes with an explicit layout and byte order
    pub fn from_raw_parts(
        bytes: Vec<u8>,
        layout: ArrayLayout,
        byte_order: ByteOrder,
    ) -> BridgeResult<Self> {
        if layout.shape.len() != layout.strides.len() {
            return Err(BridgeError::array_layout_incompatible(
                "shape and strides differ in length",
            ));
        }
        match layout.extent() {
            Some((_, end)) if end <= bytes.len() => Ok(Self::build(
                layout,
                ArrayBuffer::from_bytes(bytes),
                byte_order,
                true,
                None,
            )),
            _ => Err(BridgeError::array_layout_incompatible(format!(
                "layout {:?} with strides {:?} does not fit a buffer of {} bytes",
                layout.shape,
                layout.strides,
                bytes.len()
            ))),
        }
    }

    /// Create a new object sharing this array's buffer with another layout.
    ///
    /// The new object holds this one as its base.
    pub fn view(&self, layout: ArrayLayout) -> BridgeResult<Self> {
        if layout.shape.len() != layout.strides.len() {
            return Err(BridgeError::array_layout_incompatible(
                "shape and strides differ in length",
            ));
        }
        match layout.extent() {
            Some((_, end)) if end <= self.inner.buffer.len() => Ok(Self::build(
                layout,
                self.inner.buffer.clone(),
                self.inner.byte_order,
                self.is_writeable(),
                Some(self.clone()),
            )),
            _ => Err(BridgeError::array_layout_incompatible(
                "view layout exceeds the base buffer",
            )),
        }
    }

    /// Create a view with a slice
    pub fn slice(&self, start: &[usize], end: &[usize]) -> BridgeResult<Self> {
        self.view(self.inner.layout.slice_view(start, end)?)
    }

    /// Create a view taking every `steps[d]`-th element
    pub fn step(&self, steps: &[usize]) -> BridgeResult<Self> {
        self.view(self.inner.layout.step_view(steps)?)
    }

    /// Transpose the array (creates a view)
    pub fn transpose(&self) -> Self {
        Self::build(
            self.inner.layout.transpose(),
            self.inner.buffer.clone(),
            self.inner.byte_order,
            self.is_writeable(),
            Some(self.clone()),
        )
    }

    /// Copy into a new dense C-ordered array whose storage uses the
    /// opposite byte order. Element values are unchanged.
    pub fn byteswapped(&self) -> Self {
        let layout = ArrayLayout::c_contiguous(self.shape().to_vec(), self.dtype());
        let item = self.itemsize();
        let mut bytes = vec![0u8; layout.nbytes()];
        self.inner.buffer.read(|src| {
            for (dst, at) in bytes.chunks_mut(item).zip(self.inner.layout.element_offsets()) {
                dst.copy_from_slice(&src[at..at + item]);
                swap_element_bytes(dst, self.dtype());
            }
        });
        let byte_order = match self.inner.byte_order {
            ByteOrder::Native => ByteOrder::Swapped,
            ByteOrder::Swapped => ByteOrder::Native,
        };
        Self::build(layout, ArrayBuffer::from_bytes(bytes), byte_order, true, None)
    }

    /// Return a handle to the same object that refuses writes
    pub fn into_readonly(self) -> Self {
        Self::build(
            self.inner.layout.clone(),
            self.inner.buffer.clone(),
            self.inner.byte_order,
            false,
            Some(self),
        )
    }

    /// Get the array ID
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get the layout
    pub fn layout(&self) -> &ArrayLayout {
        &self.inner.layout
    }

    /// Get the dtype
    pub fn dtype(&self) -> DType {
        self.inner.layout.dtype
    }

    /// Size of one element in bytes
    pub fn itemsize(&self) -> usize {
        self.inner.layout.dtype.size()
    }

    /// Get the number of dimensions
    pub fn ndim(&self) -> usize {
        self.inner.layout.ndim()
    }

    /// Get the shape
    pub fn shape(&self) -> &[usize] {
        &self.inner.layout.shape
    }

    /// Get the byte strides
    pub fn strides(&self) -> &[isize] {
        &self.inner.layout.strides
    }

    /// Byte stride of dimension `dim`
    pub fn stride(&self, dim: usize) -> Option<isize> {
        self.inner.layout.strides.get(dim).copied()
    }

    /// Get the total number of elements
    pub fn size(&self) -> usize {
        self.inner.layout.size()
    }

    /// Byte order of the stored elements
    pub fn byte_order(&self) -> ByteOrder {
        self.inner.byte_order
    }

    /// Array flags
    pub fn flags(&self) -> ArrayFlags {
        self.inner.flags
    }

    /// Check whether every flag in `flags` is set
    pub fn has_flags(&self, flags: ArrayFlags) -> bool {
        self.inner.flags.contains(flags)
    }

    /// Check if the array accepts writes
    pub fn is_writeable(&self) -> bool {
        self.has_flags(ArrayFlags::WRITEABLE)
    }

    /// Shared data buffer
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.inner.buffer
    }

    /// Byte offset of the first element inside the buffer
    pub fn offset(&self) -> usize {
        self.inner.layout.offset
    }

    /// Base object this array is a view of
    pub fn base(&self) -> Option<&ArrayObject> {
        self.inner.base.as_ref()
    }

    /// Current reference count of the object
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two handles refer to the same object
    pub fn same_object(&self, other: &ArrayObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a non-owning handle
    pub fn downgrade(&self) -> WeakArray {
        WeakArray {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn expect_dtype<T: Element>(&self) -> BridgeResult<()> {
        if T::DTYPE == self.dtype() {
            Ok(())
        } else {
            Err(BridgeError::type_mismatch(T::DTYPE.name(), self.dtype().name()))
        }
    }

    fn read_at<T: Element>(&self, at: usize) -> T {
        let item = self.itemsize();
        self.inner
            .buffer
            .read(|bytes| decode(&bytes[at..at + item], self.inner.byte_order))
    }

    fn write_at<T: Element>(&self, at: usize, value: T) -> BridgeResult<()> {
        if !self.is_writeable() {
            return Err(BridgeError::read_only(format!("array {}", self.id())));
        }
        let item = self.itemsize();
        self.inner.buffer.write(|bytes| {
            let raw = &mut bytes[at..at + item];
            value.write_ne_slice(raw);
            if self.inner.byte_order == ByteOrder::Swapped {
                swap_element_bytes(raw, T::DTYPE);
            }
        });
        Ok(())
    }

    /// Read the element at a multi-index
    pub fn get<T: Element>(&self, index: &[usize]) -> BridgeResult<T> {
        self.expect_dtype::<T>()?;
        let at = self
            .inner
            .layout
            .byte_offset(index)
            .ok_or_else(|| BridgeError::index_out_of_bounds(index, self.shape()))?;
        Ok(self.read_at(at))
    }

    /// Write the element at a multi-index
    pub fn set<T: Element>(&self, index: &[usize], value: T) -> BridgeResult<()> {
        self.expect_dtype::<T>()?;
        let at = self
            .inner
            .layout
            .byte_offset(index)
            .ok_or_else(|| BridgeError::index_out_of_bounds(index, self.shape()))?;
        self.write_at(at, value)
    }

    /// Read the `flat`-th element in logical (C) order
    pub fn get_flat<T: Element>(&self, flat: usize) -> BridgeResult<T> {
        self.expect_dtype::<T>()?;
        let at = self
            .inner
            .layout
            .flat_byte_offset(flat)
            .ok_or_else(|| BridgeError::index_out_of_bounds(&[flat], &[self.size()]))?;
        Ok(self.read_at(at))
    }

    /// Write the `flat`-th element in logical (C) order
    pub fn set_flat<T: Element>(&self, flat: usize, value: T) -> BridgeResult<()> {
        self.expect_dtype::<T>()?;
        let at = self
            .inner
            .layout
            .flat_byte_offset(flat)
            .ok_or_else(|| BridgeError::index_out_of_bounds(&[flat], &[self.size()]))?;
        self.write_at(at, value)
    }

    /// Copy all elements out in logical (C) order
    ///
    /// The buffer is locked once for the whole copy.
    pub fn to_vec<T: Element>(&self) -> BridgeResult<Vec<T>> {
        self.expect_dtype::<T>()?;
        let layout = &self.inner.layout;
        let item = self.itemsize();
        let size = layout.size();
        let mut values = Vec::new();
        values.try_reserve_exact(size).map_err(|_| {
            BridgeError::memory_error(format!("cannot copy {} elements out of array", size))
        })?;

        self.inner.buffer.read(|bytes| {
            for at in layout.element_offsets() {
                let raw = bytes
                    .get(at..at + item)
                    .ok_or_else(|| BridgeError::index_out_of_bounds(&[at], &[bytes.len()]))?;
                values.push(decode(raw, self.inner.byte_order));
            }
            Ok::<_, BridgeError>(())
        })?;

        if values.len() != size {
            return Err(BridgeError::array_layout_incompatible(format!(
                "only {} of {} elements are addressable",
                values.len(),
                size
            )));
        }
        Ok(values)
    }
}

fn decode<T: Element>(raw: &[u8], byte_order: ByteOrder) -> T {
    match byte_order {
        ByteOrder::Native => T::from_ne_slice(raw),
        ByteOrder::Swapped => {
            let mut scratch = [0u8; 16];
            let scratch = &mut scratch[..raw.len()];
            scratch.copy_from_slice(raw);
            swap_element_bytes(scratch, T::DTYPE);
            T::from_ne_slice(scratch)
        }
    }
}

impl fmt::Debug for ArrayObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayObject")
            .field("id", &self.inner.id)
            .field("dtype", &self.dtype())
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("flags", &self.inner.flags)
            .finish()
    }
}
