//! Owned flat buffer allocated for a foreign caller.

use std::{
    alloc::{self, Layout, LayoutError},
    fmt::{self, Debug, Formatter},
    mem,
    ops::Deref,
    ptr::{self, NonNull},
    slice,
};

/// An owned, contiguous buffer of `len` values of type `T` with a stable
/// address that can be handed to a foreign caller.
///
/// The buffer is not `Clone`: the only way to hand it to a foreign caller is
/// [`FfiBuffer::into_raw`], and the only way to free it again is to rebuild it
/// with [`FfiBuffer::from_raw`] and drop it.
pub struct FfiBuffer<T: Copy> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T: Copy> FfiBuffer<T> {
    /// Allocates a new buffer holding a copy of the specified slice.
    pub fn new(values: &[T]) -> Self {
        // SAFETY: The allocated buffer is completely initialized by the copy
        // before it is exposed.
        unsafe {
            let ptr = alloc_buffer::<T>(values.len());

            // NOTE: Use `ptr::copy_nonoverlapping` here since the allocated
            // buffer contains uninitialized memory. Creating a `&mut [T]` over
            // it would be undefined behaviour.
            ptr::copy_nonoverlapping(values.as_ptr(), ptr.as_ptr(), values.len());

            Self {
                ptr,
                len: values.len(),
            }
        }
    }

    /// Allocates a new buffer from an iterator that reports its exact length.
    ///
    /// # Panics
    ///
    /// Panics if the iterator yields a different number of items than its
    /// `len()` reported.
    pub fn from_iter_exact<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let len = values.len();

        // SAFETY: `alloc_buffer` returns room for `len` elements and every
        // write is checked against `len` first. The buffer is released before
        // panicking on a length mismatch, so no partially written buffer
        // escapes.
        unsafe {
            let ptr = alloc_buffer::<T>(len);
            let mut written = 0;
            for value in values {
                if written == len {
                    dealloc_buffer(ptr, len);
                    panic!("iterator yielded more than {} items", len);
                }
                ptr.as_ptr().add(written).write(value);
                written += 1;
            }
            // NOTE: Partially written buffers are never exposed. `T: Copy`
            // means the written values need no drop before releasing memory.
            if written != len {
                dealloc_buffer(ptr, len);
                panic!("iterator yielded {} items but reported {}", written, len);
            }

            Self { ptr, len }
        }
    }

    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the buffer as a Rust slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` points to `len` initialized elements for as long as
        // `self` is alive. Empty buffers use a dangling, aligned pointer which
        // is valid for zero-length slices.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the buffer as a mutable Rust slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: same invariants as `as_slice`, and `&mut self` guarantees
        // exclusive access to the elements.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Transfers ownership of the buffer to the caller, returning a pointer to
    /// its first element.
    ///
    /// The length must be kept alongside the pointer in order to release the
    /// buffer with [`FfiBuffer::from_raw`].
    pub fn into_raw(self) -> *mut T {
        let ptr = self.ptr.as_ptr();
        mem::forget(self);
        ptr
    }

    /// Takes back ownership of a buffer previously released with
    /// [`FfiBuffer::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`FfiBuffer::into_raw`] on a buffer of
    /// exactly `len` elements, and must not have been reclaimed already. When
    /// `len` is zero any pointer, including null, is accepted.
    pub unsafe fn from_raw(ptr: *mut T, len: usize) -> Self {
        // NOTE: Empty buffers never own an allocation, so a null pointer from
        // the caller is replaced with the same dangling pointer `new` uses.
        let ptr = if len == 0 {
            NonNull::dangling()
        } else {
            NonNull::new_unchecked(ptr)
        };
        Self { ptr, len }
    }
}

impl<T: Copy> Drop for FfiBuffer<T> {
    fn drop(&mut self) {
        log::trace!("releasing {} byte buffer", self.len * mem::size_of::<T>());
        unsafe { dealloc_buffer(self.ptr, self.len) }
    }
}

impl<T: Copy> Deref for FfiBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Copy> AsRef<[T]> for FfiBuffer<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> Debug for FfiBuffer<T>
where
    T: Copy + Debug,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_slice(), f)
    }
}

/// Returns the memory layout for a flat buffer with the specified length.
fn buffer_layout<T>(len: usize) -> Result<Layout, LayoutError> {
    Layout::array::<T>(len)
}

/// Allocates an uninitialized flat buffer for `len` elements.
///
/// # Safety
///
/// The returned memory is *uninitialized*. It is undefined behaviour to read
/// from it before writing all `len` elements.
unsafe fn alloc_buffer<T>(len: usize) -> NonNull<T> {
    let layout = buffer_layout::<T>(len)
        .unwrap_or_else(|_| panic!("a buffer of {} elements overflows the address space", len));
    if layout.size() == 0 {
        return NonNull::dangling();
    }

    log::trace!("allocating {} byte buffer", layout.size());
    match NonNull::new(alloc::alloc(layout).cast::<T>()) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Releases a buffer allocated with [`alloc_buffer`].
unsafe fn dealloc_buffer<T>(ptr: NonNull<T>, len: usize) {
    // NOTE: The layout was valid when the buffer was allocated, so it is
    // still valid now.
    let layout = match buffer_layout::<T>(len) {
        Ok(layout) => layout,
        Err(_) => return,
    };
    if layout.size() != 0 {
        alloc::dealloc(ptr.as_ptr().cast(), layout);
    }
}
