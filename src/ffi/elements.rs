//! Closed set of element types that can cross the bridge.

use crate::{
    error::{Error, Result},
    ffi::array::{
        floats_from_ffi, ints_from_ffi, strings_from_ffi, FfiFloatArray, FfiIntArray,
        FfiStringArray,
    },
};
use std::{
    ffi::c_void,
    fmt::{self, Display, Formatter},
    os::raw::c_int,
};

/// The element type of a foreign array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ElementKind {
    String = 0,
    Int = 1,
    Float = 2,
}

impl TryFrom<c_int> for ElementKind {
    type Error = Error;

    fn try_from(tag: c_int) -> Result<Self> {
        match tag {
            0 => Ok(Self::String),
            1 => Ok(Self::Int),
            2 => Ok(Self::Float),
            _ => Err(Error::UnsupportedElementType(tag)),
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
        })
    }
}

/// A Rust-side collection of elements of one kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Elements {
    Strings(Vec<String>),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

impl Elements {
    /// Copies a foreign array of the specified kind.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `count` elements laid out as `kind` describes: a
    /// `char**` for strings, an `int*` for ints and a `float*` for floats. See
    /// [`slice_from_ffi`](crate::ffi::array::slice_from_ffi).
    pub unsafe fn from_ffi(kind: ElementKind, ptr: *const c_void, count: c_int) -> Self {
        match kind {
            ElementKind::String => Self::Strings(strings_from_ffi(ptr.cast(), count)),
            ElementKind::Int => Self::Ints(ints_from_ffi(ptr.cast(), count)),
            ElementKind::Float => Self::Floats(floats_from_ffi(ptr.cast(), count)),
        }
    }

    /// Returns the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Strings(_) => ElementKind::String,
            Self::Ints(_) => ElementKind::Int,
            Self::Floats(_) => ElementKind::Float,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Strings(values) => values.len(),
            Self::Ints(values) => values.len(),
            Self::Floats(values) => values.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates the matching foreign array result.
    pub fn to_ffi(&self) -> Result<FfiResult> {
        Ok(match self {
            Self::Strings(values) => FfiResult::Strings(FfiStringArray::new(values)?),
            Self::Ints(values) => FfiResult::Ints(FfiIntArray::new(values)),
            Self::Floats(values) => FfiResult::Floats(FfiFloatArray::new(values)),
        })
    }
}

impl Display for Elements {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Strings(values) => write!(f, "{:?}", values),
            Self::Ints(values) => write!(f, "{:?}", values),
            Self::Floats(values) => write!(f, "{:?}", values),
        }
    }
}

/// An owned foreign array result of one kind.
#[derive(Debug)]
pub enum FfiResult {
    Strings(FfiStringArray),
    Ints(FfiIntArray),
    Floats(FfiFloatArray),
}

impl FfiResult {
    /// Returns the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Strings(_) => ElementKind::String,
            Self::Ints(_) => ElementKind::Int,
            Self::Floats(_) => ElementKind::Float,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Strings(array) => array.len(),
            Self::Ints(array) => array.len(),
            Self::Floats(array) => array.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the foreign result back into Rust collections.
    pub fn to_elements(&self) -> Elements {
        match self {
            Self::Strings(array) => Elements::Strings(array.to_vec()),
            Self::Ints(array) => Elements::Ints(array.as_slice().to_vec()),
            Self::Floats(array) => Elements::Floats(array.as_slice().to_vec()),
        }
    }
}
