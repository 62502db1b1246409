use flatbridge::{ints_to_ffi, log, strings_from_ffi, IntArrayResult};
use std::os::raw::{c_char, c_int};

/// Returns the number of characters in each of `count` words. Release the
/// result with `free_int_array_result`.
///
/// # Safety
///
/// `words` must point to `count` valid null-terminated strings.
#[export_name = "word_lengths"]
pub unsafe extern "C" fn word_lengths(words: *const *const c_char, count: c_int) -> *mut IntArrayResult {
    let words = strings_from_ffi(words, count);
    log::debug!("[word_lengths] measuring {} words", words.len());

    let lengths = words
        .iter()
        .map(|word| length_to_c_int(word.chars().count()))
        .collect::<Vec<_>>();
    ints_to_ffi(&lengths)
}

/// A length that a C `int` cannot hold is fatal, like an oversized count.
fn length_to_c_int(len: usize) -> c_int {
    c_int::try_from(len).unwrap_or_else(|_| panic!("word of {} characters does not fit in a C int", len))
}
