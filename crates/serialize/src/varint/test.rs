use proptest::prelude::*;

use super::*;
use crate::serializer::to_vec;

fn roundtrip<W: Width + PartialEq + std::fmt::Debug>(values: &[W]) {
    let ser = Varint::<W>::new();
    for &value in values {
        let bytes = to_vec(&ser, &value);
        assert_eq!(bytes.len(), ser.size(&value));
        assert_eq!(ser.unmarshal(&bytes).unwrap(), (value, bytes.len()));
        assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());
    }
}

#[test]
fn boundary_values_roundtrip() {
    roundtrip::<u8>(&[0, 127, 128, u8::MAX]);
    roundtrip::<u16>(&[0, 127, 128, 16_383, 16_384, u16::MAX]);
    roundtrip::<u32>(&[0, 127, 128, 16_383, 16_384, u32::MAX]);
    roundtrip::<u64>(&[0, 127, 128, 16_383, 16_384, u64::MAX]);
    roundtrip::<usize>(&[0, 127, 128, 16_383, 16_384, usize::MAX]);
}

#[test]
fn wire_layout() {
    let ser = Varint::<u32>::new();

    assert_eq!(to_vec(&ser, &0), [0x00]);
    assert_eq!(to_vec(&ser, &127), [0x7f]);
    assert_eq!(to_vec(&ser, &128), [0x80, 0x01]);
    assert_eq!(to_vec(&ser, &300), [0xac, 0x02]);
    assert_eq!(to_vec(&ser, &16_384), [0x80, 0x80, 0x01]);
    assert_eq!(to_vec(&ser, &u32::MAX), [0xff, 0xff, 0xff, 0xff, 0x0f]);
}

#[test]
fn max_values_use_max_len() {
    assert_eq!(size(u8::MAX), u8::MAX_VARINT_LEN);
    assert_eq!(size(u16::MAX), u16::MAX_VARINT_LEN);
    assert_eq!(size(u32::MAX), u32::MAX_VARINT_LEN);
    assert_eq!(size(u64::MAX), u64::MAX_VARINT_LEN);
    assert_eq!(size(usize::MAX), usize::MAX_VARINT_LEN);
}

#[test]
fn trailing_bytes_are_not_consumed() {
    let (value, n) = unmarshal::<u16>(&[0xac, 0x02, 0xff, 0xff]).unwrap();

    assert_eq!(value, 300);
    assert_eq!(n, 2);
}

fn assert_overflow<W: Width + std::fmt::Debug>() {
    // MAX_VARINT_LEN continuation bytes followed by one more byte
    let mut bytes = vec![0xff; W::MAX_VARINT_LEN];
    bytes.push(0x01);

    let err = unmarshal::<W>(&bytes).unwrap_err();
    assert!(matches!(err.error(), Error::Overflow), "{err:?}");
    assert_eq!(err.n(), W::MAX_VARINT_LEN);

    let err = skip::<W>(&bytes).unwrap_err();
    assert!(matches!(err.error(), Error::Overflow), "{err:?}");

    // a terminating last byte that exceeds the remaining bits
    let mut bytes = vec![0xff; W::MAX_VARINT_LEN - 1];
    bytes.push(W::MAX_LAST_BYTE + 1);

    let err = unmarshal::<W>(&bytes).unwrap_err();
    assert!(matches!(err.error(), Error::Overflow), "{err:?}");
    let err = skip::<W>(&bytes).unwrap_err();
    assert!(matches!(err.error(), Error::Overflow), "{err:?}");
}

#[test]
fn overflow() {
    assert_overflow::<u8>();
    assert_overflow::<u16>();
    assert_overflow::<u32>();
    assert_overflow::<u64>();
    assert_overflow::<usize>();
}

#[test]
fn truncated_varint_is_too_small_input() {
    let err = unmarshal::<u64>(&[0x80, 0x80, 0x80]).unwrap_err();
    assert!(err.is_too_small_input());
    assert_eq!(err.n(), 3);

    let err = skip::<u64>(&[0x80, 0x80]).unwrap_err();
    assert!(err.is_too_small_input());

    let err = unmarshal::<u32>(&[]).unwrap_err();
    assert!(err.is_too_small_input());
    assert_eq!(err.n(), 0);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn marshal_into_undersized_buffer_panics() {
    let mut buf = [0u8; 1];
    marshal(300u32, &mut buf);
}

#[test]
fn zigzag_wire_values() {
    assert_eq!(encode_zigzag(0i32), 0);
    assert_eq!(encode_zigzag(-1i32), 1);
    assert_eq!(encode_zigzag(1i32), 2);
    assert_eq!(encode_zigzag(-2i32), 3);
    assert_eq!(encode_zigzag(i8::MIN), u8::MAX);
    assert_eq!(encode_zigzag(i8::MAX), u8::MAX - 1);
    assert_eq!(decode_zigzag::<i64>(u64::MAX), i64::MIN);
}

#[test]
fn zigzag_extremes_roundtrip() {
    assert_eq!(decode_zigzag::<i8>(encode_zigzag(i8::MIN)), i8::MIN);
    assert_eq!(decode_zigzag::<i16>(encode_zigzag(i16::MIN)), i16::MIN);
    assert_eq!(decode_zigzag::<i32>(encode_zigzag(i32::MIN)), i32::MIN);
    assert_eq!(decode_zigzag::<i64>(encode_zigzag(i64::MIN)), i64::MIN);
    assert_eq!(decode_zigzag::<isize>(encode_zigzag(isize::MIN)), isize::MIN);
    assert_eq!(decode_zigzag::<isize>(encode_zigzag(isize::MAX)), isize::MAX);
}

#[test]
fn small_negative_values_are_compact() {
    let ser = ZigZag::<i64>::new();

    assert_eq!(ser.size(&-1), 1);
    assert_eq!(ser.size(&-64), 1);
    assert_eq!(ser.size(&-65), 2);
}

#[test]
fn positive_skips_the_transform() {
    let ser = Positive::<i32>::new();

    assert_eq!(to_vec(&ser, &127), [0x7f]);
    assert_eq!(ser.unmarshal(&[0x7f]).unwrap(), (127, 1));
    // a negative value is representable, at the cost of the full width
    assert_eq!(ser.size(&-1), u32::MAX_VARINT_LEN);
    assert_eq!(ser.unmarshal(&to_vec(&ser, &-1)).unwrap(), (-1, 5));
}

#[test]
fn positive_isize_wraps_huge_values_to_negative() {
    let bytes = to_vec(&Varint::<usize>::new(), &usize::MAX);
    let (value, _) = Positive::<isize>::new().unmarshal(&bytes).unwrap();

    assert!(value < 0);
}

proptest! {
    #[test]
    fn zigzag_is_a_bijection_i8(value: i8) {
        prop_assert_eq!(decode_zigzag::<i8>(encode_zigzag(value)), value);
    }

    #[test]
    fn zigzag_is_a_bijection_i16(value: i16) {
        prop_assert_eq!(decode_zigzag::<i16>(encode_zigzag(value)), value);
    }

    #[test]
    fn zigzag_is_a_bijection_i32(value: i32) {
        prop_assert_eq!(decode_zigzag::<i32>(encode_zigzag(value)), value);
    }

    #[test]
    fn zigzag_is_a_bijection_i64(value: i64) {
        prop_assert_eq!(decode_zigzag::<i64>(encode_zigzag(value)), value);
    }

    #[test]
    fn zigzag_odd_outputs_are_negative_inputs(value: i32) {
        let encoded = encode_zigzag(value);
        prop_assert_eq!(encoded & 1 == 1, value < 0);
    }

    #[test]
    fn u64_size_matches_marshal_and_skip(value: u64) {
        let ser = Varint::<u64>::new();
        let bytes = to_vec(&ser, &value);

        prop_assert_eq!(bytes.len(), ser.size(&value));
        prop_assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());
        prop_assert_eq!(ser.unmarshal(&bytes).unwrap(), (value, bytes.len()));
    }

    #[test]
    fn i64_zigzag_roundtrip(value: i64) {
        let ser = ZigZag::<i64>::new();
        let bytes = to_vec(&ser, &value);

        prop_assert_eq!(ser.unmarshal(&bytes).unwrap(), (value, bytes.len()));
    }

    #[test]
    fn u16_roundtrip(value: u16) {
        let ser = Varint::<u16>::new();
        let bytes = to_vec(&ser, &value);

        prop_assert_eq!(ser.unmarshal(&bytes).unwrap(), (value, bytes.len()));
    }
}
