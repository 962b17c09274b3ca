//! Length-prefixed containers: sequences, maps, strings, byte blocks and
//! fixed-size arrays.
//!
//! # Wire Format
//!
//! ```text
//! varint(length) element_0 element_1 ... element_{length-1}
//! ```
//!
//! Maps write `length` key/value pairs, strings and byte blocks write
//! `length` raw bytes. The length is read with a pluggable length serializer
//! ([`DefaultLength`] unless configured otherwise); a negative length is
//! always [`Error::NegativeLength`], distinct from running out of input.
//!
//! # Validation and Recovery
//!
//! Every container accepts optional validators for its length and for its
//! elements. When a validator rejects, the container still tries to leave
//! the cursor at the end of the encoded container so the caller can resume
//! at the next sibling value: if the matching skippers were configured, the
//! not-yet-consumed elements are skipped and the validator's error is
//! returned with the total byte count of the container. Without skippers the
//! end cannot be found, and the error is returned with only the bytes
//! consumed so far.
//!
//! Every shape shares the same recovery routine, parameterized by the
//! skippers making up one unit (one element, or a key then a value) and the
//! number of units left.

use tracing::debug;

use crate::{
    error::{DecodeError, DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper, Validator},
    varint::Positive,
};

pub mod array;
pub mod bytes;
pub mod map;
pub mod seq;
pub mod string;

pub use array::Array;
pub use bytes::Bytes;
pub use map::{Associative, Map};
pub use seq::Seq;
pub use string::Str;

/// The length serializer containers use unless configured otherwise.
pub type DefaultLength = Positive<isize>;

/// A boxed validator over declared lengths.
pub type LengthValidator = Box<dyn Validator<usize>>;

#[allow(clippy::cast_possible_wrap)]
const fn to_isize(length: usize) -> isize {
    // in-memory containers never hold more than `isize::MAX` elements
    length as isize
}

pub(crate) fn marshal_length<L: Serializer<isize>>(
    length: &L,
    value: usize,
    buf: &mut [u8],
) -> usize {
    length.marshal(&to_isize(value), buf)
}

pub(crate) fn size_length<L: Serializer<isize>>(
    length: &L,
    value: usize,
) -> usize {
    length.size(&to_isize(value))
}

/// Reads a length prefix, rejecting negative lengths with only the prefix
/// consumed.
pub(crate) fn read_length<L: Serializer<isize>>(
    length: &L,
    buf: &[u8],
) -> DecodeResult<usize> {
    let (value, n) = length.unmarshal(buf)?;
    usize::try_from(value)
        .map(|value| (value, n))
        .map_err(|_| DecodeError::new(n, Error::NegativeLength))
}

/// Runs an optional validator. A rejection carrying one of the codec's own
/// errors is reported as that error.
pub(crate) fn validate<T: ?Sized>(
    validator: Option<&dyn Validator<T>>,
    value: &T,
) -> Result<(), Error> {
    let Some(validator) = validator else {
        return Ok(());
    };
    validator.validate(value).map_err(|error| match error.downcast::<Error>() {
        Ok(error) => *error,
        Err(error) => Error::Validation(error),
    })
}

/// Skips `count` units, each made of one value per skipper in order.
pub(crate) fn skip_units<const K: usize>(
    buf: &[u8],
    count: usize,
    skippers: [&dyn Skipper; K],
) -> SkipResult {
    let mut n = 0;
    for _ in 0..count {
        for skipper in skippers {
            n += skipper.skip(&buf[n..]).map_err(|e| e.shift(n))?;
        }
    }
    Ok(n)
}

/// Finishes a container whose length or element was rejected with `error`
/// at offset `n`.
///
/// With skippers the `remaining` units are skipped and `error` is reported at
/// the end of the container; if that skip fails its own error is returned,
/// since the cursor can no longer be trusted. Without skippers `error` is
/// reported at `n`.
pub(crate) fn reject<const K: usize>(
    buf: &[u8],
    n: usize,
    error: Error,
    remaining: usize,
    skippers: Option<[&dyn Skipper; K]>,
) -> DecodeError {
    let Some(skippers) = skippers else {
        debug!(%error, "container rejected without skipper, stopping");
        return DecodeError::new(n, error);
    };

    debug!(%error, remaining, "container rejected, skipping remaining units");

    match skip_units(&buf[n..], remaining, skippers) {
        Ok(skipped) => DecodeError::new(n + skipped, error),
        Err(skip_error) => skip_error.shift(n),
    }
}

/// Reads the payload of a string or byte block.
///
/// A rejected length either skips the opaque payload or stops after the
/// prefix, depending on `skip_on_invalid_length`.
pub(crate) fn read_block<'a, L: Serializer<isize>>(
    length: &L,
    length_validator: Option<&dyn Validator<usize>>,
    skip_on_invalid_length: bool,
    buf: &'a [u8],
) -> DecodeResult<&'a [u8]> {
    let (len, n) = read_length(length, buf)?;
    let payload = n.checked_add(len).and_then(|end| buf.get(n..end));

    if let Err(error) = validate(length_validator, &len) {
        debug!(%error, len, skip_on_invalid_length, "block length rejected");

        if !skip_on_invalid_length {
            return Err(DecodeError::new(n, error));
        }
        return Err(match payload {
            Some(_) => DecodeError::new(n + len, error),
            None => DecodeError::new(n, Error::TooSmallInput),
        });
    }

    payload
        .map(|payload| (payload, n + len))
        .ok_or(DecodeError::new(n, Error::TooSmallInput))
}

/// Skips a string or byte block.
pub(crate) fn skip_block<L: Serializer<isize>>(
    length: &L,
    buf: &[u8],
) -> SkipResult {
    let (len, n) = read_length(length, buf)?;
    match n.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(end),
        _ => Err(DecodeError::new(n, Error::TooSmallInput)),
    }
}
