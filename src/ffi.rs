//! Module containing the marshaling types for the flat C ABI: owned buffers,
//! null-terminated strings, array result headers and element dispatch.

pub mod array;
mod buffer;
pub mod elements;
pub mod string;
