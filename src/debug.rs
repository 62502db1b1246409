//! Diagnostic helpers showing the Rust view of foreign data.

use crate::ffi::{elements::Elements, string::string_from_ffi};
use std::os::raw::c_char;

/// Describes a foreign string the way the bridge decodes it.
///
/// # Safety
///
/// A non-null `ptr` must point to a valid null-terminated string.
pub unsafe fn describe_string(caller: &str, ptr: *const c_char) -> String {
    if ptr.is_null() {
        format!("{}() received null pointer", caller)
    } else {
        format!("{}() representation: {}", caller, string_from_ffi(ptr))
    }
}

/// Describes a decoded collection.
pub fn describe_elements(caller: &str, elements: &Elements) -> String {
    format!(
        "{}() representation of {} {} elements: {}",
        caller,
        elements.len(),
        elements.kind(),
        elements,
    )
}
