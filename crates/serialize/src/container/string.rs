//! UTF-8 string serializer.

use super::{
    DefaultLength, LengthValidator, marshal_length, read_block, size_length,
    skip_block,
};
use crate::{
    error::{DecodeError, DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper, Validator},
};

/// Serializes a [`String`] as a length prefix followed by its UTF-8 bytes.
///
/// The length counts bytes, not characters. A string's payload is opaque, so
/// recovering from a rejected length needs no skipper: with
/// [`Str::skip_on_invalid_length`] enabled (the default) the payload is
/// skipped and the error reports the end of the string.
pub struct Str<L = DefaultLength> {
    length: L,
    length_validator: Option<LengthValidator>,
    skip_on_invalid_length: bool,
}

impl Str {
    /// Creates a string serializer with the default length prefix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            length: DefaultLength::new(),
            length_validator: None,
            skip_on_invalid_length: true,
        }
    }
}

impl Default for Str {
    fn default() -> Self { Self::new() }
}

impl<L> Str<L> {
    /// Replaces the length serializer.
    #[must_use]
    pub fn with_length_serializer<L2>(self, length: L2) -> Str<L2> {
        Str {
            length,
            length_validator: self.length_validator,
            skip_on_invalid_length: self.skip_on_invalid_length,
        }
    }

    /// Validates the declared byte length before the payload is read.
    #[must_use]
    pub fn with_length_validator(
        mut self,
        validator: impl Validator<usize> + 'static,
    ) -> Self {
        self.length_validator = Some(Box::new(validator));
        self
    }

    /// Chooses whether a rejected length skips the payload or stops right
    /// after the prefix.
    #[must_use]
    pub const fn skip_on_invalid_length(mut self, skip: bool) -> Self {
        self.skip_on_invalid_length = skip;
        self
    }
}

impl<L: std::fmt::Debug> std::fmt::Debug for Str<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Str")
            .field("length", &self.length)
            .field("length_validator", &self.length_validator.is_some())
            .field("skip_on_invalid_length", &self.skip_on_invalid_length)
            .finish()
    }
}

impl<L: Serializer<isize>> Skipper for Str<L> {
    fn skip(&self, buf: &[u8]) -> SkipResult { skip_block(&self.length, buf) }
}

impl<L: Serializer<isize>> Serializer<String> for Str<L> {
    fn marshal(&self, value: &String, buf: &mut [u8]) -> usize {
        let n = marshal_length(&self.length, value.len(), buf);
        let end = n + value.len();
        buf[n..end].copy_from_slice(value.as_bytes());
        end
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<String> {
        let (payload, n) = read_block(
            &self.length,
            self.length_validator.as_deref(),
            self.skip_on_invalid_length,
            buf,
        )?;

        let value = std::str::from_utf8(payload)
            .map_err(|e| DecodeError::new(n, Error::InvalidUtf8(e)))?;

        Ok((value.to_owned(), n))
    }

    fn size(&self, value: &String) -> usize {
        size_length(&self.length, value.len()) + value.len()
    }
}

#[cfg(test)]
mod test;
