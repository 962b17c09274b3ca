use std::collections::BTreeMap;

use fxhash::FxHashMap;

use super::*;
use crate::{
    container::Str,
    error::{Error, ValidationError},
    serializer::to_vec,
    varint::Varint,
};

type Numbers = Map<u32, u32, Varint<u32>, Varint<u32>>;

fn numbers() -> Numbers { Map::new(Varint::new(), Varint::new()) }

fn reject_zero(value: &u32) -> Result<(), ValidationError> {
    if *value == 0 {
        return Err("zero".into());
    }
    Ok(())
}

fn reject_large(value: &u32) -> Result<(), ValidationError> {
    if *value > 255 {
        return Err("too large".into());
    }
    Ok(())
}

/// `{0: 300, 1: 2}` encoded in key order.
fn two_pairs() -> Vec<u8> {
    let value = BTreeMap::from([(0, 300), (1, 2)]);
    let bytes = to_vec(&numbers(), &value);
    assert_eq!(bytes, [2, 0, 0xac, 0x02, 1, 2]);
    bytes
}

#[test]
fn btree_roundtrip() {
    let ser = numbers();
    let value = BTreeMap::from([(3, 4), (500, 6), (7, 80_000)]);
    let bytes = to_vec(&ser, &value);

    let (decoded, n): (BTreeMap<u32, u32>, _) = ser.unmarshal(&bytes).unwrap();

    assert_eq!(ser.size(&value), bytes.len());
    assert_eq!((decoded, n), (value, bytes.len()));
    assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());
}

#[test]
fn hash_map_roundtrip() {
    let ser = Map::new(Str::new(), Varint::<u64>::new());
    let mut value = FxHashMap::default();
    value.insert("alpha".to_owned(), 1);
    value.insert("beta".to_owned(), u64::MAX);

    let bytes = to_vec(&ser, &value);
    let (decoded, n): (FxHashMap<String, u64>, _) =
        ser.unmarshal(&bytes).unwrap();

    assert_eq!(decoded, value);
    assert_eq!(n, bytes.len());
}

#[test]
fn rejected_key_skips_its_value_then_remaining_pairs() {
    let bytes = two_pairs();
    let ser = numbers()
        .with_key_validator(reject_zero)
        .with_key_skipper(Varint::<u32>::new())
        .with_value_skipper(Varint::<u32>::new());

    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();

    assert_eq!(err.n(), bytes.len());
    assert_eq!(err.validation().unwrap().to_string(), "zero");
}

#[test]
fn rejected_key_without_skippers_stops_after_key() {
    let bytes = two_pairs();
    let ser = numbers().with_key_validator(reject_zero);

    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();

    // prefix and the key
    assert_eq!(err.n(), 2);
}

#[test]
fn one_skipper_is_not_enough() {
    let bytes = two_pairs();
    let ser = numbers()
        .with_key_validator(reject_zero)
        .with_key_skipper(Varint::<u32>::new());

    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();

    assert_eq!(err.n(), 2);
}

#[test]
fn rejected_value_skips_remaining_pairs() {
    let bytes = two_pairs();
    let ser = numbers()
        .with_value_validator(reject_large)
        .with_key_skipper(Varint::<u32>::new())
        .with_value_skipper(Varint::<u32>::new());

    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();
    assert_eq!(err.n(), bytes.len());

    let ser = numbers().with_value_validator(reject_large);
    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();
    assert_eq!(err.n(), 4);
}

#[test]
fn rejected_length_skips_all_pairs() {
    let bytes = two_pairs();
    let ser = numbers()
        .with_length_validator(crate::validator::max_length(1))
        .with_key_skipper(Varint::<u32>::new())
        .with_value_skipper(Varint::<u32>::new());

    let err = Serializer::<BTreeMap<_, _>>::unmarshal(&ser, &bytes)
        .unwrap_err();

    assert!(matches!(err.error(), Error::TooLargeLength { length: 2, .. }));
    assert_eq!(err.n(), bytes.len());
}

#[test]
fn truncated_value_is_shifted() {
    let err = Serializer::<BTreeMap<_, _>>::unmarshal(
        &numbers(),
        &[2, 0, 0xac, 0x02, 1],
    )
    .unwrap_err();

    assert!(err.is_too_small_input());
    assert_eq!(err.n(), 5);
}
