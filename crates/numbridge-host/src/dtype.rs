//! Element Kinds
//!
//! The foreign runtime tags every array with an element kind ([`DType`]).
//! Native element types implement [`Element`], which ties a Rust type to
//! exactly one kind tag and knows how to read and write itself from the
//! raw bytes of a foreign buffer.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;

use crate::error::BridgeError;

// ============================================================================
// DType - Element Kind Tag
// ============================================================================

/// Element kind tag of a foreign array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean (bool_)
    Bool,

    /// Signed 8-bit integer (int8)
    Int8,
    /// Signed 16-bit integer (int16)
    Int16,
    /// Signed 32-bit integer (int32)
    Int32,
    /// Signed 64-bit integer (int64)
    Int64,

    /// Unsigned 8-bit integer (uint8)
    UInt8,
    /// Unsigned 16-bit integer (uint16)
    UInt16,
    /// Unsigned 32-bit integer (uint32)
    UInt32,
    /// Unsigned 64-bit integer (uint64)
    UInt64,

    /// 32-bit floating point (float32)
    Float32,
    /// 64-bit floating point (float64)
    Float64,

    /// 64-bit complex (complex64 = 2x float32)
    Complex64,
    /// 128-bit complex (complex128 = 2x float64)
    Complex128,
}

impl DType {
    /// Every kind the foreign runtime knows about.
    pub const ALL: [DType; 13] = [
        DType::Bool,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    /// Get the size in bytes for this dtype
    pub fn size(&self) -> usize {
        match self {
            DType::Bool => 1,
            DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 | DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }

    /// Size of one byte-order unit. Complex values swap each half separately.
    pub fn component_size(&self) -> usize {
        if self.is_complex() {
            self.size() / 2
        } else {
            self.size()
        }
    }

    /// Get the alignment requirement for this dtype
    pub fn alignment(&self) -> usize {
        self.component_size()
    }

    /// Get the one-character type code
    pub fn type_char(&self) -> char {
        match self {
            DType::Bool => '?',
            DType::Int8 => 'b',
            DType::Int16 => 'h',
            DType::Int32 => 'i',
            DType::Int64 => 'l',
            DType::UInt8 => 'B',
            DType::UInt16 => 'H',
            DType::UInt32 => 'I',
            DType::UInt64 => 'L',
            DType::Float32 => 'f',
            DType::Float64 => 'd',
            DType::Complex64 => 'F',
            DType::Complex128 => 'D',
        }
    }

    /// Get the dtype name (e.g., "float64")
    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DType::Int8
                | DType::Int16
                | DType::Int32
                | DType::Int64
                | DType::UInt8
                | DType::UInt16
                | DType::UInt32
                | DType::UInt64
        )
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Check if this is a complex type
    pub fn is_complex(&self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// Check if this is a signed type
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DType::Int8
                | DType::Int16
                | DType::Int32
                | DType::Int64
                | DType::Float32
                | DType::Float64
                | DType::Complex64
                | DType::Complex128
        )
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" | "bool_" | "?" => Ok(DType::Bool),
            "int8" | "i1" | "b" => Ok(DType::Int8),
            "int16" | "i2" | "h" => Ok(DType::Int16),
            "int32" | "i4" | "i" => Ok(DType::Int32),
            "int64" | "i8" | "l" => Ok(DType::Int64),
            "uint8" | "u1" | "B" => Ok(DType::UInt8),
            "uint16" | "u2" | "H" => Ok(DType::UInt16),
            "uint32" | "u4" | "I" => Ok(DType::UInt32),
            "uint64" | "u8" | "L" => Ok(DType::UInt64),
            "float32" | "f4" | "f" => Ok(DType::Float32),
            "float64" | "f8" | "d" | "float" => Ok(DType::Float64),
            "complex64" | "c8" | "F" => Ok(DType::Complex64),
            "complex128" | "c16" | "D" | "complex" => Ok(DType::Complex128),
            _ => Err(BridgeError::unsupported_dtype(s)),
        }
    }
}

// ============================================================================
// Byte Order
// ============================================================================

/// Byte order of the elements stored in a foreign buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Machine byte order
    #[default]
    Native,
    /// Opposite of machine byte order
    Swapped,
}

/// Reverse the bytes of each byte-order unit of one element in place.
pub fn swap_element_bytes(bytes: &mut [u8], dtype: DType) {
    for unit in bytes.chunks_mut(dtype.component_size()) {
        unit.reverse();
    }
}

// ============================================================================
// Element - Native Element Types
// ============================================================================

/// Trait for native types that can be array elements.
///
/// Each implementation corresponds to exactly one [`DType`].
pub trait Element: Copy + PartialEq + fmt::Debug + Default + Send + Sync + 'static {
    /// The element kind tag this type reads and writes
    const DTYPE: DType;

    /// Decode from native-order bytes (`bytes.len() >= DTYPE.size()`)
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Encode into native-order bytes (`out.len() >= DTYPE.size()`)
    fn write_ne_slice(self, out: &mut [u8]);
}

macro_rules! impl_primitive_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                    <$ty>::from_ne_bytes(raw)
                }

                fn write_ne_slice(self, out: &mut [u8]) {
                    out[..std::mem::size_of::<$ty>()].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_primitive_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn from_ne_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_ne_slice(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }
}

macro_rules! impl_complex_element {
    ($($part:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for Complex<$part> {
                const DTYPE: DType = DType::$dtype;

                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let half = std::mem::size_of::<$part>();
                    Complex::new(
                        <$part>::from_ne_slice(&bytes[..half]),
                        <$part>::from_ne_slice(&bytes[half..2 * half]),
                    )
                }

                fn write_ne_slice(self, out: &mut [u8]) {
                    let half = std::mem::size_of::<$part>();
                    self.re.write_ne_slice(&mut out[..half]);
                    self.im.write_ne_slice(&mut out[half..2 * half]);
                }
            }
        )*
    };
}

impl_complex_element! {
    f32 => Complex64,
    f64 => Complex128,
}
