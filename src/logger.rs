//! Module containing logger implementation.

use crate::{config::Config, ffi::string::FfiString};
use log::{Level, Log, Metadata, Record};
use std::{os::raw::c_char, sync::Mutex};

/// A foreign callback receiving log records. The message is only valid for
/// the duration of the call.
pub type LogSink = extern "C" fn(level: u32, message: *const c_char);

static SINK: Mutex<Option<LogSink>> = Mutex::new(None);

/// The main logger implementation for the `log` facade crate.
pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let sink = match SINK.lock() {
            Ok(sink) => *sink,
            Err(poisoned) => *poisoned.into_inner(),
        };
        let message = record.args().to_string();
        match sink {
            Some(sink) => {
                // NOTE: NUL bytes would truncate the message on the foreign
                // side, so they are escaped.
                let message = FfiString::new(message.replace('\0', "\\0"));
                if let Ok(message) = message {
                    sink(level_code(record.level()), message.as_ptr());
                }
            }
            None => eprintln!("[{} {}] {}", record.level(), record.target(), message),
        }
    }

    fn flush(&self) {}
}

/// Routes log records to `sink`, or back to standard error for `None`.
pub fn set_sink(sink: Option<LogSink>) {
    match SINK.lock() {
        Ok(mut current) => *current = sink,
        Err(poisoned) => *poisoned.into_inner() = sink,
    }
}

/// Initialize logging. Calling this more than once only updates the level.
pub fn init(config: &Config) {
    static LOGGER: Logger = Logger;
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(config.log_level);
}

fn level_code(level: Level) -> u32 {
    match level {
        Level::Error => ERROR,
        Level::Warn => WARNING,
        Level::Info => INFO,
        Level::Debug | Level::Trace => DEBUG,
    }
}

const ERROR: u32 = 1;
const WARNING: u32 = 2;
const INFO: u32 = 3;
const DEBUG: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;
    use std::{
        ffi::CStr,
        sync::atomic::{AtomicU32, Ordering},
    };

    static LAST_LEVEL: AtomicU32 = AtomicU32::new(0);
    static LAST_LEN: AtomicU32 = AtomicU32::new(0);

    extern "C" fn capture(level: u32, message: *const c_char) {
        let message = unsafe { CStr::from_ptr(message) };
        LAST_LEVEL.store(level, Ordering::SeqCst);
        LAST_LEN.store(message.to_bytes().len() as u32, Ordering::SeqCst);
    }

    #[test]
    fn records_are_forwarded_to_sink() {
        log::set_max_level(LevelFilter::Info);
        set_sink(Some(capture));
        Logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("a\0b"))
                .build(),
        );
        set_sink(None);

        assert_eq!(LAST_LEVEL.load(Ordering::SeqCst), WARNING);
        assert_eq!(LAST_LEN.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn level_codes_follow_host_convention() {
        assert_eq!(level_code(Level::Error), 1);
        assert_eq!(level_code(Level::Warn), 2);
        assert_eq!(level_code(Level::Info), 3);
        assert_eq!(level_code(Level::Debug), 4);
        assert_eq!(level_code(Level::Trace), 4);
    }
}
