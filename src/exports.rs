//! The exported C ABI surface.
//!
//! Every function here only takes pointers, C `int`s and C `float`s. Results
//! returned to the caller must be released with the matching `free_*`
//! function; releasing twice is undefined behaviour.

use crate::{
    abort,
    config::{Config, ABI_VERSION},
    debug,
    ffi::{
        array::{
            self, floats_from_ffi, floats_to_ffi, ints_from_ffi, ints_to_ffi,
            string_bytes_array_from_ffi, FfiStringArray, FloatArrayResult, IntArrayResult,
            StringArrayResult,
        },
        elements::{ElementKind, Elements},
        string::{self, string_bytes_from_ffi, FfiString},
    },
    logger::{self, LogSink},
};
use std::{
    ffi::c_void,
    os::raw::{c_char, c_float, c_int},
};

/// Installs the panic hook and logger. Safe to call more than once.
#[export_name = "flatbridge_init"]
pub extern "C" fn init() {
    abort::set_panic_hook();
    logger::init(&Config::from_env());
}

/// Returns the C ABI version implemented by the library.
#[export_name = "flatbridge_abi_version"]
pub extern "C" fn abi_version() -> u32 {
    ABI_VERSION
}

/// Routes log records to `sink`. A null `sink` routes them back to standard
/// error.
#[export_name = "flatbridge_set_log_sink"]
pub extern "C" fn set_log_sink(sink: Option<LogSink>) {
    logger::set_sink(sink);
}

/// Returns a byte-for-byte copy of a C string. Release the result with
/// `FreeCString`.
///
/// # Safety
///
/// A non-null `ptr` must point to a valid null-terminated string.
#[export_name = "return_string"]
pub unsafe extern "C" fn return_string(ptr: *const c_char) -> *mut c_char {
    abort::or_abort(|| Ok(FfiString::from_bytes(string_bytes_from_ffi(ptr))?.into_raw()))
}

/// Returns a byte-for-byte copy of a C string array. Release the result with
/// `free_string_array_result`.
///
/// # Safety
///
/// `ptr` must point to `count` valid null-terminated strings.
#[export_name = "return_string_array"]
pub unsafe extern "C" fn return_string_array(
    ptr: *const *const c_char,
    count: c_int,
) -> *mut StringArrayResult {
    abort::or_abort(|| {
        Ok(FfiStringArray::from_bytes(string_bytes_array_from_ffi(ptr, count))?.into_raw())
    })
}

/// Decodes a C `int` array and returns a new copy of it. Release the result
/// with `free_int_array_result`.
///
/// # Safety
///
/// `ptr` must point to `count` `int`s.
#[export_name = "return_int_array"]
pub unsafe extern "C" fn return_int_array(ptr: *const c_int, count: c_int) -> *mut IntArrayResult {
    abort::or_abort(|| Ok(ints_to_ffi(&ints_from_ffi(ptr, count))))
}

/// Decodes a C `float` array and returns a new copy of it. Release the result
/// with `free_float_array_result`.
///
/// # Safety
///
/// `ptr` must point to `count` `float`s.
#[export_name = "return_float_array"]
pub unsafe extern "C" fn return_float_array(
    ptr: *const c_float,
    count: c_int,
) -> *mut FloatArrayResult {
    abort::or_abort(|| Ok(floats_to_ffi(&floats_from_ffi(ptr, count))))
}

/// Prints the decoded representation of a C string.
///
/// # Safety
///
/// A non-null `ptr` must point to a valid null-terminated string.
#[export_name = "print_string"]
pub unsafe extern "C" fn print_string(ptr: *const c_char) {
    println!("{}", debug::describe_string("print_string", ptr));
}

/// Prints the decoded representation of a C string array.
///
/// # Safety
///
/// `ptr` must point to `count` valid null-terminated strings.
#[export_name = "print_string_array"]
pub unsafe extern "C" fn print_string_array(ptr: *const *const c_char, count: c_int) {
    print_array(ElementKind::String as c_int, ptr.cast(), count);
}

/// Prints the decoded representation of a C `int` array.
///
/// # Safety
///
/// `ptr` must point to `count` `int`s.
#[export_name = "print_int_array"]
pub unsafe extern "C" fn print_int_array(ptr: *const c_int, count: c_int) {
    print_array(ElementKind::Int as c_int, ptr.cast(), count);
}

/// Prints the decoded representation of a C `float` array.
///
/// # Safety
///
/// `ptr` must point to `count` `float`s.
#[export_name = "print_float_array"]
pub unsafe extern "C" fn print_float_array(ptr: *const c_float, count: c_int) {
    print_array(ElementKind::Float as c_int, ptr.cast(), count);
}

/// Prints the decoded representation of an array whose element type is given
/// by `kind` (0 = string, 1 = int, 2 = float). An unknown `kind` aborts.
///
/// # Safety
///
/// `ptr` must point to `count` elements of the type `kind` describes.
#[export_name = "print_array"]
pub unsafe extern "C" fn print_array(kind: c_int, ptr: *const c_void, count: c_int) {
    abort::or_abort(|| {
        let kind = ElementKind::try_from(kind)?;
        let caller = match kind {
            ElementKind::String => "print_string_array",
            ElementKind::Int => "print_int_array",
            ElementKind::Float => "print_float_array",
        };
        let elements = Elements::from_ffi(kind, ptr, count);
        println!("{}", debug::describe_elements(caller, &elements));
        Ok(())
    })
}

/// Releases a string returned by this library. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from this library and not be released twice.
#[export_name = "FreeCString"]
pub unsafe extern "C" fn free_cstring(ptr: *mut c_char) {
    string::free_string(ptr);
}

/// Releases the `data` array of a string array result, along with every
/// string in it. The header itself is left allocated and must not be passed
/// to `free_string_array_result` afterwards; prefer that function when the
/// header is at hand.
///
/// # Safety
///
/// `ptr` and `count` must be the `data` and `numberOfElements` of a string
/// array result returned by this library.
#[export_name = "FreeStringArray"]
pub unsafe extern "C" fn free_string_array(ptr: *mut *mut c_char, count: c_int) {
    array::free_string_array(ptr, count);
}

/// Releases a string array result with all of its strings.
///
/// # Safety
///
/// `ptr` must come from this library and not be released twice.
#[export_name = "free_string_array_result"]
pub unsafe extern "C" fn free_string_array_result(ptr: *mut StringArrayResult) {
    array::free_string_array_result(ptr);
}

/// Releases an `int` array result.
///
/// # Safety
///
/// `ptr` must come from this library and not be released twice.
#[export_name = "free_int_array_result"]
pub unsafe extern "C" fn free_int_array_result(ptr: *mut IntArrayResult) {
    array::free_int_array_result(ptr);
}

/// Releases a `float` array result.
///
/// # Safety
///
/// `ptr` must come from this library and not be released twice.
#[export_name = "free_float_array_result"]
pub unsafe extern "C" fn free_float_array_result(ptr: *mut FloatArrayResult) {
    array::free_float_array_result(ptr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{array::strings_from_ffi, string::string_from_ffi};
    use std::{
        ffi::{CStr, CString},
        ptr, slice,
    };

    fn c_strings(strings: &[&str]) -> (Vec<CString>, Vec<*const c_char>) {
        let owned = strings
            .iter()
            .map(|s| CString::new(*s).unwrap())
            .collect::<Vec<_>>();
        let pointers = owned.iter().map(|s| s.as_ptr()).collect();
        (owned, pointers)
    }

    #[test]
    fn abi_version_is_stable() {
        assert_eq!(abi_version(), 1);
    }

    #[test]
    fn string_echo_is_a_new_allocation() {
        let input = CString::new("Hello World").unwrap();
        unsafe {
            let output = return_string(input.as_ptr());
            assert_ne!(output as *const c_char, input.as_ptr());
            assert_eq!(string_from_ffi(output), "Hello World");
            free_cstring(output);
        }
    }

    #[test]
    fn null_string_echoes_as_empty() {
        unsafe {
            let output = return_string(ptr::null());
            assert_eq!(string_from_ffi(output), "");
            free_cstring(output);
            free_cstring(ptr::null_mut());
        }
    }

    #[test]
    fn string_array_echo_preserves_order() {
        let input = ["", "Hello World", "!@$#^%!#@@%*!", "AWDsadfSA", "\u{2764}", "\x41", "\n"];
        let (_owned, pointers) = c_strings(&input);
        unsafe {
            let result = return_string_array(pointers.as_ptr(), pointers.len() as c_int);
            assert_eq!((*result).number_of_elements, input.len() as c_int);

            let slots = slice::from_raw_parts((*result).data, input.len());
            for (slot, original) in slots.iter().zip(pointers.iter()) {
                assert_ne!(*slot as *const c_char, *original);
            }
            assert_eq!(
                strings_from_ffi((*result).data as _, (*result).number_of_elements),
                input,
            );
            free_string_array_result(result);
        }
    }

    #[test]
    fn string_echo_keeps_invalid_utf8() {
        let input = CString::new(vec![0x66, 0xff, 0x6f]).unwrap();
        unsafe {
            let output = return_string(input.as_ptr());
            assert_eq!(CStr::from_ptr(output).to_bytes(), input.as_bytes());
            free_cstring(output);
        }
    }

    #[test]
    fn string_array_echo_keeps_invalid_utf8() {
        let owned = [
            CString::new(vec![0x66, 0xff, 0x6f]).unwrap(),
            CString::new(vec![0xc3, 0x28]).unwrap(),
            CString::new("ok").unwrap(),
        ];
        let pointers = owned.iter().map(|s| s.as_ptr()).collect::<Vec<_>>();
        unsafe {
            let result = return_string_array(pointers.as_ptr(), 3);
            let slots = slice::from_raw_parts((*result).data, 3);
            for (slot, original) in slots.iter().zip(owned.iter()) {
                assert_eq!(CStr::from_ptr(*slot).to_bytes(), original.as_bytes());
            }
            free_string_array_result(result);
        }
    }

    #[test]
    fn empty_raw_string_array_release_accepts_null() {
        unsafe { free_string_array(ptr::null_mut(), 0) };
    }

    #[test]
    fn numeric_echo_round_trips() {
        let ints = [12345, -9999, 0, i32::MIN, i32::MAX];
        let floats = [0.0f32, -0.0, 1.5e-45, f32::MAX, f32::NAN];
        unsafe {
            let result = return_int_array(ints.as_ptr(), ints.len() as c_int);
            assert_eq!(
                ints_from_ffi((*result).data, (*result).number_of_elements),
                ints,
            );
            free_int_array_result(result);

            let result = return_float_array(floats.as_ptr(), floats.len() as c_int);
            let output = floats_from_ffi((*result).data, (*result).number_of_elements);
            assert_eq!(
                output.iter().map(|f| f.to_bits()).collect::<Vec<_>>(),
                floats.iter().map(|f| f.to_bits()).collect::<Vec<_>>(),
            );
            free_float_array_result(result);
        }
    }

    #[test]
    fn empty_echoes_release_cleanly() {
        unsafe {
            free_string_array_result(return_string_array(ptr::null(), 0));
            free_int_array_result(return_int_array(ptr::null(), 0));
            free_float_array_result(return_float_array(ptr::null(), 0));
        }
    }

    #[test]
    fn raw_string_array_release() {
        let (_owned, pointers) = c_strings(&["Reeeee", "TeDiOuS"]);
        unsafe {
            let result = return_string_array(pointers.as_ptr(), 2);
            let header = Box::from_raw(result);
            free_string_array(header.data, header.number_of_elements);
        }
    }

    #[test]
    fn print_helpers_do_not_take_ownership() {
        let (_owned, pointers) = c_strings(&["Here", "are", "some"]);
        let ints = [1, 2, 3];
        let floats = [1.0f32, 2.604, 3.14159];
        unsafe {
            print_string(pointers[0]);
            print_string(ptr::null());
            print_string_array(pointers.as_ptr(), 3);
            print_int_array(ints.as_ptr(), 3);
            print_float_array(floats.as_ptr(), 3);
            print_array(ElementKind::Int as c_int, ints.as_ptr().cast(), 3);
            assert_eq!(string_from_ffi(pointers[2]), "some");
        }
        assert_eq!(ints, [1, 2, 3]);
    }
}
