//! The four-operation serializer contract and its companion capabilities.
//!
//! A [`Serializer`] knows how to marshal, unmarshal, measure and skip values
//! of one logical type. Serializers are plain values and compose: a sequence
//! serializer is built from an element serializer, a pointer serializer from
//! a pointee serializer, and so on.
//!
//! [`Skipper`] and [`Validator`] are the two capabilities the validated
//! container protocol is parameterized by. Every serializer is also a
//! skipper.

use crate::error::{DecodeResult, SkipResult, ValidationError};

/// Consumes the bytes of one encoded unit without constructing a value.
pub trait Skipper {
    /// Skips one encoded value at the start of `buf` and returns the number
    /// of bytes it occupies.
    ///
    /// # Errors
    ///
    /// Returns the same errors the matching unmarshal would return for
    /// malformed or truncated input.
    fn skip(&self, buf: &[u8]) -> SkipResult;
}

/// Encodes, decodes, measures and skips values of type `T`.
///
/// # Example
///
/// ```ignore
/// use knit_serialize::{Serializer, varint::Varint};
///
/// let ser = Varint::<u32>::new();
/// let mut buf = vec![0; ser.size(&300)];
/// let n = ser.marshal(&300, &mut buf);
///
/// assert_eq!(ser.unmarshal(&buf).unwrap(), (300, n));
/// ```
pub trait Serializer<T>: Skipper {
    /// Writes `value` to the start of `buf` and returns the number of bytes
    /// written.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`Serializer::size`] of `value`. The
    /// size must always be consulted before marshalling.
    fn marshal(&self, value: &T, buf: &mut [u8]) -> usize;

    /// Reads a value from the start of `buf` and returns it together with the
    /// number of bytes consumed. Trailing bytes are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`](crate::DecodeError) describing the failure
    /// and how many bytes were consumed when it happened.
    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<T>;

    /// Returns the exact number of bytes [`Serializer::marshal`] writes for
    /// `value`.
    fn size(&self, value: &T) -> usize;
}

/// A predicate over a decoded value or a declared length.
///
/// Any closure `Fn(&T) -> Result<(), ValidationError>` is a validator.
pub trait Validator<T: ?Sized> {
    /// Accepts or rejects `value`.
    ///
    /// # Errors
    ///
    /// Returns the caller-defined reason for rejecting `value`.
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

impl<T: ?Sized, F: Fn(&T) -> Result<(), ValidationError>> Validator<T> for F {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self(value)
    }
}

impl<S: Skipper + ?Sized> Skipper for &S {
    fn skip(&self, buf: &[u8]) -> SkipResult { (**self).skip(buf) }
}

impl<S: Skipper + ?Sized> Skipper for Box<S> {
    fn skip(&self, buf: &[u8]) -> SkipResult { (**self).skip(buf) }
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for &S {
    fn marshal(&self, value: &T, buf: &mut [u8]) -> usize {
        (**self).marshal(value, buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<T> {
        (**self).unmarshal(buf)
    }

    fn size(&self, value: &T) -> usize { (**self).size(value) }
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for Box<S> {
    fn marshal(&self, value: &T, buf: &mut [u8]) -> usize {
        (**self).marshal(value, buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<T> {
        (**self).unmarshal(buf)
    }

    fn size(&self, value: &T) -> usize { (**self).size(value) }
}

/// Encodes `value` into a freshly allocated buffer of exactly
/// [`Serializer::size`] bytes.
///
/// # Example
///
/// ```ignore
/// use knit_serialize::{serializer::to_vec, varint::ZigZag};
///
/// assert_eq!(to_vec(&ZigZag::<i32>::new(), &-1), vec![0x01]);
/// ```
pub fn to_vec<T, S: Serializer<T> + ?Sized>(
    serializer: &S,
    value: &T,
) -> Vec<u8> {
    let mut buf = vec![0; serializer.size(value)];
    let n = serializer.marshal(value, &mut buf);
    debug_assert_eq!(n, buf.len(), "marshal wrote a different size");
    buf
}
