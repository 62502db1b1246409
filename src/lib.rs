//! Marshaling bridge between Rust collections and a flat C ABI 🦀
//!
//! Inbound converters copy foreign buffers (`char**`, `int*`, `float*` plus an
//! explicit count) into Rust collections without taking ownership of them.
//! Outbound converters allocate foreign-owned results described by small
//! `{ int numberOfElements; T* data; }` headers, and every outbound result has
//! exactly one matching release function.
//!
//! On the Rust side each result is an owning handle ([`FfiStringArray`],
//! [`FfiIntArray`], [`FfiFloatArray`], [`FfiString`]) that is not `Clone`:
//! dropping it is the release, and `into_raw` is the only way to hand it over.

mod abort;
pub mod config;
mod debug;
mod error;
pub mod ffi;
mod logger;

pub use self::{
    error::{Error, Result},
    ffi::{
        array::{
            floats_from_ffi, floats_to_ffi, ints_from_ffi, ints_to_ffi, slice_from_ffi,
            string_bytes_array_from_ffi, strings_from_ffi, strings_to_ffi, FfiArray, FfiFloatArray, FfiIntArray,
            FfiStringArray, FloatArrayResult, IntArrayResult, StringArrayResult,
        },
        elements::{ElementKind, Elements, FfiResult},
        string::{string_bytes_from_ffi, string_from_ffi, string_to_ffi, FfiStr, FfiString},
    },
    logger::LogSink,
};
pub use log;

/// Module containing the exported C functions.
#[doc(hidden)]
pub mod exports;
