//! Opaque byte block serializer.

use super::{
    DefaultLength, LengthValidator, marshal_length, read_block, size_length,
    skip_block,
};
use crate::{
    error::{DecodeResult, SkipResult},
    serializer::{Serializer, Skipper, Validator},
};

/// Serializes a [`Vec<u8>`] as a length prefix followed by the bytes
/// verbatim.
///
/// Prefer this over a [`Seq`](super::Seq) of bytes: the payload is copied in
/// one go and, like [`Str`](super::Str), a rejected length can be recovered
/// from without a skipper.
pub struct Bytes<L = DefaultLength> {
    length: L,
    length_validator: Option<LengthValidator>,
    skip_on_invalid_length: bool,
}

impl Bytes {
    /// Creates a byte block serializer with the default length prefix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            length: DefaultLength::new(),
            length_validator: None,
            skip_on_invalid_length: true,
        }
    }
}

impl Default for Bytes {
    fn default() -> Self { Self::new() }
}

impl<L> Bytes<L> {
    /// Replaces the length serializer.
    #[must_use]
    pub fn with_length_serializer<L2>(self, length: L2) -> Bytes<L2> {
        Bytes {
            length,
            length_validator: self.length_validator,
            skip_on_invalid_length: self.skip_on_invalid_length,
        }
    }

    /// Validates the declared length before the payload is read.
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

impl<L: std::fmt::Debug> std::fmt::Debug for Bytes<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bytes")
            .field("length", &self.length)
            .field("length_validator", &self.length_validator.is_some())
            .field("skip_on_invalid_length", &self.skip_on_invalid_length)
            .finish()
    }
}

impl<L: Serializer<isize>> Skipper for Bytes<L> {
    fn skip(&self, buf: &[u8]) -> SkipResult { skip_block(&self.length, buf) }
}

impl<L: Serializer<isize>> Serializer<Vec<u8>> for Bytes<L> {
    fn marshal(&self, value: &Vec<u8>, buf: &mut [u8]) -> usize {
        let n = marshal_length(&self.length, value.len(), buf);
        let end = n + value.len();
        buf[n..end].copy_from_slice(value);
        end
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Vec<u8>> {
        let (payload, n) = read_block(
            &self.length,
            self.length_validator.as_deref(),
            self.skip_on_invalid_length,
            buf,
        )?;
        Ok((payload.to_vec(), n))
    }

    fn size(&self, value: &Vec<u8>) -> usize {
        size_length(&self.length, value.len()) + value.len()
    }
}
