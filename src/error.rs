//! Error type for the Rust side of the bridge.
//!
//! Nothing here crosses the C ABI. Exported functions log an error and abort
//! instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("string contains a NUL byte at position {position}")]
    InteriorNul { position: usize },

    #[error("unsupported element type tag: {0}")]
    UnsupportedElementType(i32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
