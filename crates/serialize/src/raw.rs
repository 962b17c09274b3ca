//! Fixed-width leaf serializers.
//!
//! [`Raw`] writes primitives in little-endian order using exactly their
//! in-memory width, which suits floats and integers whose values are spread
//! evenly over their range. [`Bool`], [`Char`] and [`Opt`] cover the
//! remaining leaf shapes containers and graphs are usually built from.

use std::marker::PhantomData;

use crate::{
    error::{DecodeError, DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper},
    varint,
};

/// A primitive with a fixed-width little-endian representation.
pub trait Primitive: Copy {
    /// The number of bytes the primitive occupies.
    const SIZE: usize;

    /// Writes the little-endian bytes into `buf[..Self::SIZE]`.
    fn write_le(self, buf: &mut [u8]);

    /// Reads a value from exactly [`Primitive::SIZE`] bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),+) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn write_le(self, buf: &mut [u8]) {
                    buf[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut array = [0u8; std::mem::size_of::<$ty>()];
                    array.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(array)
                }
            }
        )+
    };
}

impl_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// Fixed-width little-endian serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Raw<T>(PhantomData<fn() -> T>);

impl<T> Raw<T> {
    /// Creates a new serializer.
    #[must_use]
    pub const fn new() -> Self { Self(PhantomData) }
}

impl<T: Primitive> Skipper for Raw<T> {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        if buf.len() < T::SIZE {
            return Err(DecodeError::new(0, Error::TooSmallInput));
        }
        Ok(T::SIZE)
    }
}

impl<T: Primitive> Serializer<T> for Raw<T> {
    fn marshal(&self, value: &T, buf: &mut [u8]) -> usize {
        value.write_le(buf);
        T::SIZE
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<T> {
        let bytes = buf
            .get(..T::SIZE)
            .ok_or(DecodeError::new(0, Error::TooSmallInput))?;
        Ok((T::read_le(bytes), T::SIZE))
    }

    fn size(&self, _value: &T) -> usize { T::SIZE }
}

/// One-byte boolean serializer: `0` is `false`, `1` is `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bool;

impl Skipper for Bool {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        self.unmarshal(buf).map(|(_, n)| n)
    }
}

impl Serializer<bool> for Bool {
    fn marshal(&self, value: &bool, buf: &mut [u8]) -> usize {
        buf[0] = u8::from(*value);
        1
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<bool> {
        match buf.first() {
            Some(0) => Ok((false, 1)),
            Some(1) => Ok((true, 1)),
            Some(&byte) => Err(DecodeError::new(1, Error::WrongFormat(byte))),
            None => Err(DecodeError::new(0, Error::TooSmallInput)),
        }
    }

    fn size(&self, _value: &bool) -> usize { 1 }
}

/// Unicode scalar serializer, written as a `u32` varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Char;

impl Skipper for Char {
    fn skip(&self, buf: &[u8]) -> SkipResult { varint::skip::<u32>(buf) }
}

impl Serializer<char> for Char {
    fn marshal(&self, value: &char, buf: &mut [u8]) -> usize {
        varint::marshal(u32::from(*value), buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<char> {
        let (code, n) = varint::unmarshal::<u32>(buf)?;
        char::from_u32(code)
            .map(|c| (c, n))
            .ok_or(DecodeError::new(n, Error::InvalidChar(code)))
    }

    fn size(&self, value: &char) -> usize { varint::size(u32::from(*value)) }
}

/// Option serializer: a presence byte (`0` none, `1` some) followed by the
/// inner value when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Opt<S>(pub S);

impl<S: Skipper> Skipper for Opt<S> {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        match buf.first() {
            Some(0) => Ok(1),
            Some(1) => Ok(1 + self.0.skip(&buf[1..]).map_err(|e| e.shift(1))?),
            Some(&byte) => Err(DecodeError::new(1, Error::WrongFormat(byte))),
            None => Err(DecodeError::new(0, Error::TooSmallInput)),
        }
    }
}

impl<T, S: Serializer<T>> Serializer<Option<T>> for Opt<S> {
    fn marshal(&self, value: &Option<T>, buf: &mut [u8]) -> usize {
        match value {
            Some(value) => {
                buf[0] = 1;
                1 + self.0.marshal(value, &mut buf[1..])
            }
            None => {
                buf[0] = 0;
                1
            }
        }
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Option<T>> {
        match buf.first() {
            Some(0) => Ok((None, 1)),
            Some(1) => {
                let (value, n) =
                    self.0.unmarshal(&buf[1..]).map_err(|e| e.shift(1))?;
                Ok((Some(value), n + 1))
            }
            Some(&byte) => Err(DecodeError::new(1, Error::WrongFormat(byte))),
            None => Err(DecodeError::new(0, Error::TooSmallInput)),
        }
    }

    fn size(&self, value: &Option<T>) -> usize {
        1 + value.as_ref().map_or(0, |value| self.0.size(value))
    }
}
