//! # numbridge host
//!
//! The host side of the numbridge marshaling layer: the scripting
//! runtime's array object model and the binding framework's conversion
//! registry. Converters in `numbridge-convert` consume both.
//!
//! ## Overview
//!
//! - Element kinds and their native counterparts (`DType`, `Element`)
//! - Strided memory layouts (`ArrayLayout`)
//! - Reference-counted foreign arrays sharing one buffer across views
//!   (`ArrayObject`, `WeakArray`)
//! - Dynamically typed runtime values (`ForeignObject`, `ArrayScalar`)
//! - The ordered converter registry (`ConverterRegistry`)
//!
//! ## Module Structure
//!
//! - [`dtype`]: element kind tags and the `Element` trait
//! - [`layout`]: shape/stride arithmetic
//! - [`array`]: foreign array objects and their flags
//! - [`object`]: foreign values and type hints
//! - [`registry`]: converter registration and lookup
//! - [`error`]: error types

pub mod array;
pub mod dtype;
pub mod error;
pub mod layout;
pub mod object;
pub mod registry;

// Re-export main types for convenience
pub use array::{ArrayBuffer, ArrayFlags, ArrayObject, WeakArray};
pub use dtype::{ByteOrder, DType, Element};
pub use error::{BridgeError, BridgeResult};
pub use layout::{ArrayLayout, ArrayOrder, ElementOffsets};
pub use object::{ArrayScalar, ForeignObject, ForeignType};
pub use registry::{Convertible, ConverterRegistry, RvalueConverter, ToForeignConverter};
