//! Variable-length integer encoding.
//!
//! Unsigned integers are written as little-endian groups of 7 bits. Every
//! byte except the last has its most significant bit set to signal that
//! another group follows, so small values stay small on the wire:
//!
//! ```text
//! 0      => 00
//! 127    => 7f
//! 128    => 80 01
//! 16_384 => 80 80 01
//! ```
//!
//! Signed integers are mapped to unsigned ones with the zigzag transform
//! before encoding, which keeps small negative numbers small as well. Values
//! known never to be negative, such as lengths, can use [`Positive`] to skip
//! the transform.
//!
//! Decoding guards against inputs carrying more precision than the target
//! width: a varint that does not terminate within the width's maximum group
//! count, or whose final group does not fit the width's remaining bits,
//! fails with [`Error::Overflow`] instead of silently truncating.

use std::marker::PhantomData;

use crate::{
    error::{DecodeError, DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper},
};

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("knit_serialize supports only 32-bit and 64-bit targets");

#[cfg(target_pointer_width = "32")]
type NativeUnsigned = u32;

#[cfg(target_pointer_width = "64")]
type NativeUnsigned = u64;

mod sealed {
    pub trait Sealed {}
}

/// An unsigned integer width supported by the varint codec.
///
/// This trait is sealed; it is implemented for `u8`, `u16`, `u32`, `u64`
/// and `usize`.
pub trait Width: Copy + sealed::Sealed {
    /// The largest number of bytes a value of this width encodes to.
    const MAX_VARINT_LEN: usize;

    /// The largest value the byte at position `MAX_VARINT_LEN - 1` may hold.
    const MAX_LAST_BYTE: u8;

    /// Widens the value to 64 bits.
    fn to_u64(self) -> u64;

    /// Narrows a 64-bit value known to fit this width.
    fn from_u64(value: u64) -> Self;
}

macro_rules! impl_width {
    ($($ty:ty => $len:expr, $last:expr;)+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Width for $ty {
                const MAX_VARINT_LEN: usize = $len;
                const MAX_LAST_BYTE: u8 = $last;

                fn to_u64(self) -> u64 { u64::from(self) }

                #[allow(clippy::cast_possible_truncation)]
                fn from_u64(value: u64) -> Self { value as $ty }
            }
        )+
    };
}

impl_width! {
    u8 => 2, 0x01;
    u16 => 3, 0x03;
    u32 => 5, 0x0f;
    u64 => 10, 0x01;
}

impl sealed::Sealed for usize {}

impl Width for usize {
    const MAX_VARINT_LEN: usize = <NativeUnsigned as Width>::MAX_VARINT_LEN;
    const MAX_LAST_BYTE: u8 = <NativeUnsigned as Width>::MAX_LAST_BYTE;

    fn to_u64(self) -> u64 { self as u64 }

    #[allow(clippy::cast_possible_truncation)]
    fn from_u64(value: u64) -> Self { value as Self }
}

/// A signed integer width supported by the zigzag and positive codecs.
///
/// This trait is sealed; it is implemented for `i8`, `i16`, `i32`, `i64`
/// and `isize`.
pub trait SignedWidth: Copy + sealed::Sealed {
    /// The unsigned integer of the same width.
    type Unsigned: Width;

    /// Maps the value onto its zigzag counterpart.
    fn encode_zigzag(self) -> Self::Unsigned;

    /// Inverts [`SignedWidth::encode_zigzag`].
    fn decode_zigzag(value: Self::Unsigned) -> Self;

    /// Reinterprets the bits as unsigned.
    fn to_unsigned(self) -> Self::Unsigned;

    /// Reinterprets unsigned bits as signed.
    fn from_unsigned(value: Self::Unsigned) -> Self;
}

macro_rules! impl_signed_width {
    ($($ty:ty => $unsigned:ty;)+) => {
        $(
            impl sealed::Sealed for $ty {}

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
            impl SignedWidth for $ty {
                type Unsigned = $unsigned;

                fn encode_zigzag(self) -> $unsigned {
                    if self < 0 {
                        !(self << 1) as $unsigned
                    } else {
                        (self << 1) as $unsigned
                    }
                }

                fn decode_zigzag(value: $unsigned) -> Self {
                    if value & 1 == 0 {
                        (value >> 1) as Self
                    } else {
                        !((value >> 1) as Self)
                    }
                }

                fn to_unsigned(self) -> $unsigned { self as $unsigned }

                fn from_unsigned(value: $unsigned) -> Self { value as Self }
            }
        )+
    };
}

impl_signed_width! {
    i8 => u8;
    i16 => u16;
    i32 => u32;
    i64 => u64;
    isize => usize;
}

/// Maps a signed integer onto an unsigned one so that values of small
/// magnitude stay small: `0, -1, 1, -2, ...` become `0, 1, 2, 3, ...`.
#[must_use]
pub fn encode_zigzag<I: SignedWidth>(value: I) -> I::Unsigned {
    value.encode_zigzag()
}

/// Inverts [`encode_zigzag`]. Even inputs decode to non-negative values, odd
/// inputs to negative ones.
#[must_use]
pub fn decode_zigzag<I: SignedWidth>(value: I::Unsigned) -> I {
    I::decode_zigzag(value)
}

/// Writes `value` as a varint to the start of `buf` and returns the number
/// of bytes written.
///
/// # Panics
///
/// Panics if `buf` is shorter than [`size`] of `value`.
#[allow(clippy::cast_possible_truncation)]
pub fn marshal<W: Width>(value: W, buf: &mut [u8]) -> usize {
    let mut value = value.to_u64();
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Reads a varint of width `W` from the start of `buf`.
///
/// # Errors
///
/// - [`Error::TooSmallInput`] if `buf` ends before the terminating byte; the
///   whole buffer counts as consumed.
/// - [`Error::Overflow`] if the varint does not fit `W`; the bytes up to and
///   including the offending one count as consumed.
pub fn unmarshal<W: Width>(buf: &[u8]) -> DecodeResult<W> {
    let mut value = 0u64;
    let mut shift = 0;
    for (i, &byte) in buf.iter().enumerate() {
        // at the last permitted position a continuation bit is an overflow
        // too, since `MAX_LAST_BYTE` is always below 0x80
        if i == W::MAX_VARINT_LEN - 1 && byte > W::MAX_LAST_BYTE {
            return Err(DecodeError::new(i + 1, Error::Overflow));
        }
        if byte < 0x80 {
            return Ok((W::from_u64(value | (u64::from(byte) << shift)), i + 1));
        }
        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }
    Err(DecodeError::new(buf.len(), Error::TooSmallInput))
}

/// Returns the number of bytes `value` occupies as a varint.
#[must_use]
pub fn size<W: Width>(value: W) -> usize {
    let mut value = value.to_u64();
    let mut n = 1;
    while value >= 0x80 {
        value >>= 7;
        n += 1;
    }
    n
}

/// Skips a varint of width `W` at the start of `buf`.
///
/// # Errors
///
/// Fails exactly when [`unmarshal`] would.
pub fn skip<W: Width>(buf: &[u8]) -> SkipResult {
    for (i, &byte) in buf.iter().enumerate() {
        if i == W::MAX_VARINT_LEN - 1 && byte > W::MAX_LAST_BYTE {
            return Err(DecodeError::new(i + 1, Error::Overflow));
        }
        if byte < 0x80 {
            return Ok(i + 1);
        }
    }
    Err(DecodeError::new(buf.len(), Error::TooSmallInput))
}

/// Varint serializer for unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Varint<W>(PhantomData<fn() -> W>);

impl<W> Varint<W> {
    /// Creates a new serializer.
    #[must_use]
    pub const fn new() -> Self { Self(PhantomData) }
}

impl<W: Width> Skipper for Varint<W> {
    fn skip(&self, buf: &[u8]) -> SkipResult { skip::<W>(buf) }
}

impl<W: Width> Serializer<W> for Varint<W> {
    fn marshal(&self, value: &W, buf: &mut [u8]) -> usize {
        marshal(*value, buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<W> { unmarshal(buf) }

    fn size(&self, value: &W) -> usize { size(*value) }
}

/// Varint serializer for signed integers using the zigzag transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZigZag<I>(PhantomData<fn() -> I>);

impl<I> ZigZag<I> {
    /// Creates a new serializer.
    #[must_use]
    pub const fn new() -> Self { Self(PhantomData) }
}

impl<I: SignedWidth> Skipper for ZigZag<I> {
    fn skip(&self, buf: &[u8]) -> SkipResult { skip::<I::Unsigned>(buf) }
}

impl<I: SignedWidth> Serializer<I> for ZigZag<I> {
    fn marshal(&self, value: &I, buf: &mut [u8]) -> usize {
        marshal(value.encode_zigzag(), buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<I> {
        let (value, n) = unmarshal::<I::Unsigned>(buf)?;
        Ok((I::decode_zigzag(value), n))
    }

    fn size(&self, value: &I) -> usize { size(value.encode_zigzag()) }
}

/// Varint serializer for signed integers that are never negative.
///
/// The bits are reinterpreted as unsigned without the zigzag transform,
/// which saves one bit of range per byte. A negative value still
/// round-trips, but costs the width's maximum number of bytes; a decoded
/// value past the signed maximum comes back negative, which is how length
/// prefixes detect [`Error::NegativeLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Positive<I>(PhantomData<fn() -> I>);

impl<I> Positive<I> {
    /// Creates a new serializer.
    #[must_use]
    pub const fn new() -> Self { Self(PhantomData) }
}

impl<I: SignedWidth> Skipper for Positive<I> {
    fn skip(&self, buf: &[u8]) -> SkipResult { skip::<I::Unsigned>(buf) }
}

impl<I: SignedWidth> Serializer<I> for Positive<I> {
    fn marshal(&self, value: &I, buf: &mut [u8]) -> usize {
        marshal(value.to_unsigned(), buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<I> {
        let (value, n) = unmarshal::<I::Unsigned>(buf)?;
        Ok((I::from_unsigned(value), n))
    }

    fn size(&self, value: &I) -> usize { size(value.to_unsigned()) }
}

#[cfg(test)]
mod test;
