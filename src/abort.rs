//! Module implementing the fatal-failure path of the exported surface.
//!
//! Nothing crosses the C ABI as an error value: a failure is logged and the
//! process is aborted.

use crate::error::Result;
use std::{
    panic::{self, AssertUnwindSafe},
    process,
};

/// Sets the panic hook to report panics through the bridge logger.
pub fn set_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let message = if let Some(message) = info.payload().downcast_ref::<&str>() {
            (*message).to_owned()
        } else if let Some(message) = info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            info.to_string()
        };
        match info.location() {
            Some(location) => log::error!(
                "panicked at {}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                message,
            ),
            None => log::error!("panicked: {}", message),
        }
    }));
}

/// Runs `f`, aborting the process if it fails or panics.
pub fn or_abort<T>(f: impl FnOnce() -> Result<T>) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            log::error!("fatal: {}", err);
            process::abort()
        }
        // NOTE: The panic hook already reported the failure.
        Err(_) => process::abort(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_calls_pass_through() {
        assert_eq!(or_abort(|| Ok(42)), 42);
    }
}
