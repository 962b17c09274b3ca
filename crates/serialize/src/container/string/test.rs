use super::*;
use crate::{error::ValidationError, serializer::to_vec, validator::max_length};

fn reject_all(_: &usize) -> Result<(), ValidationError> {
    Err("rejected".into())
}

#[test]
fn roundtrip() {
    let ser = Str::new();

    for value in ["", "knit", "grüße", "🧶 yarn"] {
        let value = value.to_owned();
        let bytes = to_vec(&ser, &value);

        assert_eq!(bytes.len(), ser.size(&value));
        assert_eq!(usize::from(bytes[0]), value.len());
        assert_eq!(ser.unmarshal(&bytes).unwrap(), (value, bytes.len()));
        assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());
    }
}

#[test]
fn decodes_only_the_declared_bytes() {
    let (value, n) = Str::new().unmarshal(b"\x02hi there").unwrap();

    assert_eq!(value, "hi");
    assert_eq!(n, 3);
}

#[test]
fn invalid_utf8() {
    let err = Str::new().unmarshal(&[2, 0xc3, 0x28]).unwrap_err();

    assert!(matches!(err.error(), Error::InvalidUtf8(_)));
    assert_eq!(err.n(), 3);
}

#[test]
fn truncated_payload() {
    let err = Str::new().unmarshal(b"\x05abc").unwrap_err();

    assert!(err.is_too_small_input());
    assert_eq!(err.n(), 1);
}

#[test]
fn rejected_length_skips_payload() {
    let bytes = b"\x05hello\x01";
    let ser = Str::new().with_length_validator(reject_all);

    let err = ser.unmarshal(bytes).unwrap_err();

    assert!(err.validation().is_some());
    assert_eq!(err.n(), 6);
}

#[test]
fn rejected_length_stops_after_prefix() {
    let ser = Str::new()
        .with_length_validator(reject_all)
        .skip_on_invalid_length(false);

    let err = ser.unmarshal(b"\x05hello").unwrap_err();

    assert!(err.validation().is_some());
    assert_eq!(err.n(), 1);
}

#[test]
fn rejected_length_with_missing_payload() {
    let ser = Str::new().with_length_validator(max_length(2));

    let err = ser.unmarshal(b"\x05hel").unwrap_err();

    assert!(err.is_too_small_input());
    assert_eq!(err.n(), 1);
}

#[test]
fn accepted_length() {
    let ser = Str::new().with_length_validator(max_length(5));

    assert_eq!(
        ser.unmarshal(b"\x05hello").unwrap(),
        ("hello".to_owned(), 6)
    );
}
