//! Null-terminated foreign string implementation.

use crate::error::{Error, Result};
use std::{
    borrow::Cow,
    ffi::{CStr, CString},
    fmt::{self, Debug, Formatter},
    ops::Deref,
    os::raw::c_char,
    str::Utf8Error,
};

/// A borrowed null-terminated foreign string.
///
/// This is a view: it never owns or frees the memory it points to.
#[repr(transparent)]
pub struct FfiStr {
    inner: CStr,
}

impl FfiStr {
    /// Wraps a raw null-terminated foreign string.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and point to a null-terminated byte sequence
    /// that stays alive and unmodified for the lifetime `'a`.
    pub unsafe fn from_ptr<'a>(ptr: *const c_char) -> &'a FfiStr {
        Self::from_c_str(CStr::from_ptr(ptr))
    }

    fn from_c_str(s: &CStr) -> &FfiStr {
        // SAFETY: `FfiStr` has a `transparent` representation and so has an
        // identical memory representation to a `CStr`.
        unsafe { &*(s as *const CStr as *const FfiStr) }
    }

    /// Returns the string bytes, without the terminator.
    pub fn to_bytes(&self) -> &[u8] {
        self.inner.to_bytes()
    }

    /// Converts the foreign string into a `&str`, failing on invalid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        self.inner.to_str()
    }

    /// Converts the foreign string into a Rust string, replacing invalid data
    /// with the replacement character (`U+FFFD`).
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.inner.to_string_lossy()
    }

    /// Returns the raw pointer to the first byte of the string.
    pub fn as_ptr(&self) -> *const c_char {
        self.inner.as_ptr()
    }
}

impl Debug for FfiStr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.to_string_lossy(), f)
    }
}

/// An owned null-terminated foreign string.
pub struct FfiString {
    inner: CString,
}

impl FfiString {
    /// Creates a new foreign string from a Rust string slice.
    ///
    /// Fails if the string contains a NUL byte, since it could not be
    /// represented without truncation.
    pub fn new(s: impl AsRef<str>) -> Result<Self> {
        Self::from_bytes(s.as_ref().as_bytes())
    }

    /// Creates a new foreign string from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let inner = CString::new(bytes).map_err(|err| Error::InteriorNul {
            position: err.nul_position(),
        })?;
        Ok(Self { inner })
    }

    /// Returns a reference to a borrowed foreign string.
    pub fn as_ffi_str(&self) -> &FfiStr {
        FfiStr::from_c_str(&self.inner)
    }

    /// Transfers ownership of the string to the caller.
    pub fn into_raw(self) -> *mut c_char {
        self.inner.into_raw()
    }

    /// Takes back ownership of a string released with [`FfiString::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`FfiString::into_raw`] and must not
    /// have been reclaimed already.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        Self {
            inner: CString::from_raw(ptr),
        }
    }
}

impl Deref for FfiString {
    type Target = FfiStr;

    fn deref(&self) -> &Self::Target {
        self.as_ffi_str()
    }
}

impl Debug for FfiString {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_ffi_str(), f)
    }
}

/// Copies the bytes of a foreign string, up to but excluding the terminator.
/// No decoding happens, so the copy is byte-for-byte.
///
/// A null pointer yields an empty vector.
///
/// # Safety
///
/// A non-null `ptr` must point to a valid null-terminated byte sequence.
pub unsafe fn string_bytes_from_ffi(ptr: *const c_char) -> Vec<u8> {
    if ptr.is_null() {
        return Vec::new();
    }
    FfiStr::from_ptr(ptr).to_bytes().to_vec()
}

/// Copies a foreign string into a Rust `String`. Invalid UTF-8 is replaced
/// with `U+FFFD`; use [`string_bytes_from_ffi`] for an exact copy.
///
/// A null pointer yields an empty string.
///
/// # Safety
///
/// A non-null `ptr` must point to a valid null-terminated byte sequence.
pub unsafe fn string_from_ffi(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    FfiStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Allocates a foreign-owned copy of `s`. Release it with [`free_string`].
pub fn string_to_ffi(s: &str) -> Result<*mut c_char> {
    Ok(FfiString::new(s)?.into_raw())
}

/// Releases a string allocated by [`string_to_ffi`]. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from [`string_to_ffi`] (or
/// [`FfiString::into_raw`]) and must not be released twice.
pub unsafe fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(FfiString::from_raw(ptr));
    }
}
