//! Foreign array result headers and their owning handles.
//!
//! Every outbound array is described to the caller by a small `#[repr(C)]`
//! header holding the element count and a pointer to the flat data. The
//! handles in this module own the header together with everything it points
//! to; dropping a handle is the release operation.

use crate::{
    error::Result,
    ffi::{
        buffer::FfiBuffer,
        elements::ElementKind,
        string::{string_bytes_from_ffi, string_from_ffi, FfiStr, FfiString},
    },
};
use std::{
    fmt::{self, Debug, Formatter},
    mem::ManuallyDrop,
    os::raw::{c_char, c_float, c_int},
    ptr, slice,
};

/// C layout of an array result: `{ int numberOfElements; T* data; }`.
#[repr(C)]
#[derive(Debug)]
pub struct RawArrayResult<T> {
    pub number_of_elements: c_int,
    pub data: *mut T,
}

/// `{ int numberOfElements; char** data; }`
pub type StringArrayResult = RawArrayResult<*mut c_char>;
/// `{ int numberOfElements; int* data; }`
pub type IntArrayResult = RawArrayResult<c_int>;
/// `{ int numberOfElements; float* data; }`
pub type FloatArrayResult = RawArrayResult<c_float>;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
}

/// A fixed-width numeric element that can be stored in a flat array result.
pub trait Element: Copy + Debug + sealed::Sealed {
    /// The tag describing this element type.
    const KIND: ElementKind;
}

impl Element for c_int {
    const KIND: ElementKind = ElementKind::Int;
}

impl Element for c_float {
    const KIND: ElementKind = ElementKind::Float;
}

/// An owned flat numeric array result.
pub struct FfiArray<T: Element> {
    // NOTE: Field order is drop order: the data buffer is released before the
    // header that points to it.
    data: FfiBuffer<T>,
    header: Box<RawArrayResult<T>>,
}

/// An owned `int` array result.
pub type FfiIntArray = FfiArray<c_int>;
/// An owned `float` array result.
pub type FfiFloatArray = FfiArray<c_float>;

impl<T: Element> FfiArray<T> {
    /// Allocates a new array result holding a copy of `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` has more elements than a C `int` can count.
    pub fn new(values: &[T]) -> Self {
        let number_of_elements = count_from_len(values.len());
        let mut data = FfiBuffer::new(values);
        let header = Box::new(RawArrayResult {
            number_of_elements,
            data: data.as_mut_slice().as_mut_ptr(),
        });
        log::debug!("allocated {} array of {} elements", T::KIND, values.len());

        Self { data, header }
    }

    /// Returns the number of elements in the array.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the array elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Transfers ownership of the array to the caller.
    pub fn into_raw(self) -> *mut RawArrayResult<T> {
        let Self { data, header } = self;
        let _ = data.into_raw();
        Box::into_raw(header)
    }

    /// Takes back ownership of an array released with
    /// [`FfiArray::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`FfiArray::into_raw`] with the same element
    /// type, with its fields unmodified, and must not be reclaimed twice.
    pub unsafe fn from_raw(ptr: *mut RawArrayResult<T>) -> Self {
        let header = Box::from_raw(ptr);
        let data = FfiBuffer::from_raw(header.data, len_from_count(header.number_of_elements));
        Self { data, header }
    }
}

impl<T: Element> Debug for FfiArray<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_slice(), f)
    }
}

/// The `char*` slots of a string array result. Each slot owns an
/// independently allocated string.
struct StringSlots(FfiBuffer<*mut c_char>);

impl StringSlots {
    fn into_raw(self) -> *mut *mut c_char {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the buffer is moved out exactly
        // once.
        unsafe { ptr::read(&this.0) }.into_raw()
    }
}

impl Drop for StringSlots {
    fn drop(&mut self) {
        // NOTE: Strings first. The slot buffer itself is released afterwards
        // when the inner `FfiBuffer` drops.
        for &slot in self.0.iter() {
            drop(unsafe { FfiString::from_raw(slot) });
        }
    }
}

/// An owned string array result.
pub struct FfiStringArray {
    slots: StringSlots,
    header: Box<StringArrayResult>,
}

impl FfiStringArray {
    /// Allocates a new string array result holding copies of `strings`, in
    /// order.
    ///
    /// Fails if any string contains a NUL byte. Strings allocated before the
    /// failure are released.
    ///
    /// # Panics
    ///
    /// Panics if there are more strings than a C `int` can count.
    pub fn new<I, S>(strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strings = strings
            .into_iter()
            .map(FfiString::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_owned(strings))
    }

    /// Allocates a new string array result holding exact copies of the byte
    /// strings in `items`, in order. The bytes need not be valid UTF-8.
    ///
    /// Fails if any item contains a NUL byte, releasing everything allocated
    /// so far.
    ///
    /// # Panics
    ///
    /// Panics if there are more items than a C `int` can count.
    pub fn from_bytes<I, B>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        let strings = items
            .into_iter()
            .map(FfiString::from_bytes)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_owned(strings))
    }

    fn from_owned(strings: Vec<FfiString>) -> Self {
        let number_of_elements = count_from_len(strings.len());

        let mut slots = StringSlots(FfiBuffer::from_iter_exact(
            strings.into_iter().map(FfiString::into_raw),
        ));
        let header = Box::new(StringArrayResult {
            number_of_elements,
            data: slots.0.as_mut_slice().as_mut_ptr(),
        });
        log::debug!("allocated string array of {} elements", slots.0.len());

        Self { slots, header }
    }

    /// Returns the number of strings in the array.
    pub fn len(&self) -> usize {
        self.slots.0.len()
    }

    /// Returns `true` if the array has no strings.
    pub fn is_empty(&self) -> bool {
        self.slots.0.is_empty()
    }

    /// Returns the string at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<&FfiStr> {
        let slot = *self.slots.0.get(index)?;
        // SAFETY: Every slot holds a live string owned by `self`.
        Some(unsafe { FfiStr::from_ptr(slot) })
    }

    /// Iterates over the strings in order.
    pub fn iter(&self) -> impl Iterator<Item = &FfiStr> + '_ {
        self.slots
            .0
            .iter()
            .map(|&slot| unsafe { FfiStr::from_ptr(slot) })
    }

    /// Copies the strings into Rust `String`s.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    /// Transfers ownership of the array and all of its strings to the caller.
    pub fn into_raw(self) -> *mut StringArrayResult {
        let Self { slots, header } = self;
        let _ = slots.into_raw();
        Box::into_raw(header)
    }

    /// Takes back ownership of an array released with
    /// [`FfiStringArray::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`FfiStringArray::into_raw`], with its fields and
    /// slots unmodified, and must not be reclaimed twice.
    pub unsafe fn from_raw(ptr: *mut StringArrayResult) -> Self {
        let header = Box::from_raw(ptr);
        let slots = string_slots_from_raw(header.data, header.number_of_elements);
        Self { slots, header }
    }
}

impl Debug for FfiStringArray {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

unsafe fn string_slots_from_raw(ptr: *mut *mut c_char, count: c_int) -> StringSlots {
    StringSlots(FfiBuffer::from_raw(ptr, len_from_count(count)))
}

/// Converts an element count to the C header representation.
fn count_from_len(len: usize) -> c_int {
    c_int::try_from(len)
        .unwrap_or_else(|_| panic!("{} elements do not fit in a C int count", len))
}

/// Converts a C element count to a length. A negative count is a caller
/// contract violation.
fn len_from_count(count: c_int) -> usize {
    usize::try_from(count).unwrap_or_else(|_| panic!("negative element count {}", count))
}

/// Views a foreign flat array of `count` elements as a slice.
///
/// A zero `count` never dereferences `ptr`.
///
/// # Safety
///
/// When `count > 0`, `ptr` must be non-null, aligned and point to `count`
/// initialized elements that stay alive and unmodified for `'a`.
///
/// # Panics
///
/// Panics if `count` is negative.
pub unsafe fn slice_from_ffi<'a, T>(ptr: *const T, count: c_int) -> &'a [T] {
    let len = len_from_count(count);
    if len == 0 {
        return &[];
    }
    slice::from_raw_parts(ptr, len)
}

/// Copies a foreign `int` array into a Rust vector.
///
/// # Safety
///
/// See [`slice_from_ffi`].
pub unsafe fn ints_from_ffi(ptr: *const c_int, count: c_int) -> Vec<i32> {
    slice_from_ffi(ptr, count).to_vec()
}

/// Copies a foreign `float` array into a Rust vector.
///
/// # Safety
///
/// See [`slice_from_ffi`].
pub unsafe fn floats_from_ffi(ptr: *const c_float, count: c_int) -> Vec<f32> {
    slice_from_ffi(ptr, count).to_vec()
}

/// Copies a foreign `char*` array into a vector of Rust strings. Invalid
/// UTF-8 is replaced with `U+FFFD`; use [`string_bytes_array_from_ffi`] for
/// exact copies.
///
/// The input array and its strings are left untouched.
///
/// # Safety
///
/// See [`slice_from_ffi`]. Additionally every slot must point to a valid
/// null-terminated string.
pub unsafe fn strings_from_ffi(ptr: *const *const c_char, count: c_int) -> Vec<String> {
    slice_from_ffi(ptr, count)
        .iter()
        .map(|&s| string_from_ffi(s))
        .collect()
}

/// Copies the bytes of every string in a foreign `char*` array, without
/// decoding. A null slot copies as an empty byte string.
///
/// # Safety
///
/// See [`strings_from_ffi`].
pub unsafe fn string_bytes_array_from_ffi(
    ptr: *const *const c_char,
    count: c_int,
) -> Vec<Vec<u8>> {
    slice_from_ffi(ptr, count)
        .iter()
        .map(|&s| string_bytes_from_ffi(s))
        .collect()
}

/// Allocates a foreign-owned `int` array result.
pub fn ints_to_ffi(values: &[i32]) -> *mut IntArrayResult {
    FfiArray::new(values).into_raw()
}

/// Allocates a foreign-owned `float` array result.
pub fn floats_to_ffi(values: &[f32]) -> *mut FloatArrayResult {
    FfiArray::new(values).into_raw()
}

/// Allocates a foreign-owned string array result.
pub fn strings_to_ffi<S: AsRef<str>>(strings: &[S]) -> Result<*mut StringArrayResult> {
    Ok(FfiStringArray::new(strings)?.into_raw())
}

/// Releases every string of a `char*` array and then the array itself.
///
/// The count is trusted as-is; it is not checked against the allocation.
///
/// # Safety
///
/// `ptr` must be the `data` pointer of a string array result allocated by
/// this crate, `count` its element count, and the header must not be released
/// afterwards through [`free_string_array_result`].
pub unsafe fn free_string_array(ptr: *mut *mut c_char, count: c_int) {
    drop(string_slots_from_raw(ptr, count));
}

/// Releases a string array result: strings, then the slot array, then the
/// header. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from this crate and must not be released twice.
pub unsafe fn free_string_array_result(ptr: *mut StringArrayResult) {
    if !ptr.is_null() {
        drop(FfiStringArray::from_raw(ptr));
    }
}

/// Releases an `int` array result: data, then header. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from this crate and must not be released twice.
pub unsafe fn free_int_array_result(ptr: *mut IntArrayResult) {
    if !ptr.is_null() {
        drop(FfiIntArray::from_raw(ptr));
    }
}

/// Releases a `float` array result: data, then header. Null is a no-op.
///
/// # Safety
///
/// A non-null `ptr` must come from this crate and must not be released twice.
pub unsafe fn free_float_array_result(ptr: *mut FloatArrayResult) {
    if !ptr.is_null() {
        drop(FfiFloatArray::from_raw(ptr));
    }
}
