//! Property-based tests for the marshaling round trips.
//!
//! Whatever goes out through an outbound converter must come back unchanged
//! through the matching inbound converter, with the count in the header equal
//! to the input length.

use flatbridge::{
    floats_from_ffi, floats_to_ffi, ints_from_ffi, ints_to_ffi, string_from_ffi, string_to_ffi,
    strings_from_ffi, strings_to_ffi, Elements, FfiIntArray, FfiStringArray,
};
use proptest::prelude::*;
use std::os::raw::c_char;

/// Strings without NUL bytes, including control characters and escapes.
fn c_compatible_string() -> impl Strategy<Value = String> {
    "[^\\x00]{0,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn string_round_trip(s in c_compatible_string()) {
        let raw = string_to_ffi(&s).unwrap();
        let decoded = unsafe { string_from_ffi(raw) };
        unsafe { flatbridge::exports::free_cstring(raw) };
        prop_assert_eq!(decoded, s);
    }

    #[test]
    fn string_array_round_trip(strings in prop::collection::vec(c_compatible_string(), 0..16)) {
        let result = strings_to_ffi(&strings[..]).unwrap();
        let decoded = unsafe {
            prop_assert_eq!((*result).number_of_elements as usize, strings.len());
            strings_from_ffi((*result).data as *const *const c_char, (*result).number_of_elements)
        };
        unsafe { flatbridge::exports::free_string_array_result(result) };
        prop_assert_eq!(decoded, strings);
    }

    #[test]
    fn int_array_round_trip(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let result = ints_to_ffi(&values);
        let decoded = unsafe {
            prop_assert_eq!((*result).number_of_elements as usize, values.len());
            ints_from_ffi((*result).data, (*result).number_of_elements)
        };
        unsafe { flatbridge::exports::free_int_array_result(result) };
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn float_array_round_trip_is_bit_exact(bits in prop::collection::vec(any::<u32>(), 0..64)) {
        let values = bits.iter().copied().map(f32::from_bits).collect::<Vec<_>>();
        let result = floats_to_ffi(&values);
        let decoded = unsafe {
            prop_assert_eq!((*result).number_of_elements as usize, values.len());
            floats_from_ffi((*result).data, (*result).number_of_elements)
        };
        unsafe { flatbridge::exports::free_float_array_result(result) };
        prop_assert_eq!(decoded.into_iter().map(f32::to_bits).collect::<Vec<_>>(), bits);
    }

    #[test]
    fn outbound_copies_do_not_alias_inputs(mut values in prop::collection::vec(any::<i32>(), 1..32)) {
        let array = FfiIntArray::new(&values);
        let original = values.clone();
        for value in values.iter_mut() {
            *value = value.wrapping_add(1);
        }
        prop_assert_eq!(array.as_slice(), &original[..]);
    }

    #[test]
    fn inbound_copies_do_not_alias_foreign_buffers(strings in prop::collection::vec(c_compatible_string(), 1..8)) {
        let array = FfiStringArray::new(&strings).unwrap();
        let mut decoded = array.to_vec();
        decoded[0].push('!');
        prop_assert_eq!(array.to_vec(), strings);
    }

    #[test]
    fn elements_round_trip(values in prop::collection::vec(any::<i32>(), 0..32)) {
        let elements = Elements::Ints(values);
        let result = elements.to_ffi().unwrap();
        prop_assert_eq!(result.len(), elements.len());
        prop_assert_eq!(result.to_elements(), elements);
    }
}

#[test]
fn concrete_string_scenario() {
    let input = vec!["", "Hello World", "!@$#^%!#@@%*!", "\n"];
    let array = FfiStringArray::new(&input).unwrap();
    assert_eq!(array.len(), 4);

    let raw = array.into_raw();
    unsafe {
        assert_eq!(
            strings_from_ffi((*raw).data as *const *const c_char, (*raw).number_of_elements),
            input,
        );
        flatbridge::exports::free_string_array_result(raw);
    }
}

#[test]
fn concrete_int_scenario() {
    let raw = ints_to_ffi(&[12345, -9999, 0]);
    unsafe {
        assert_eq!((*raw).number_of_elements, 3);
        assert_eq!(
            ints_from_ffi((*raw).data, (*raw).number_of_elements),
            vec![12345, -9999, 0],
        );
        flatbridge::exports::free_int_array_result(raw);
    }
}
