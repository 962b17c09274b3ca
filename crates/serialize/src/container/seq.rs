//! Sequence serializer for [`Vec`].

use std::marker::PhantomData;

use super::{
    DefaultLength, LengthValidator, marshal_length, read_length, reject,
    size_length, skip_units, validate,
};
use crate::{
    error::{DecodeResult, SkipResult},
    serializer::{Serializer, Skipper, Validator},
};

/// Serializes a [`Vec<T>`] as a length prefix followed by its elements.
///
/// # Example
///
/// ```ignore
/// use knit_serialize::{container::Seq, validator::max_length, varint::Varint};
///
/// let ser = Seq::new(Varint::<u32>::new())
///     .with_length_validator(max_length(16))
///     .with_element_skipper(Varint::<u32>::new());
/// ```
pub struct Seq<T, S, L = DefaultLength> {
    element: S,
    length: L,
    length_validator: Option<LengthValidator>,
    element_validator: Option<Box<dyn Validator<T>>>,
    element_skipper: Option<Box<dyn Skipper>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Seq<T, S> {
    /// Creates a sequence serializer from an element serializer.
    #[must_use]
    pub fn new(element: S) -> Self {
        Self {
            element,
            length: DefaultLength::new(),
            length_validator: None,
            element_validator: None,
            element_skipper: None,
            _marker: PhantomData,
        }
    }
}

impl<T, S, L> Seq<T, S, L> {
    /// Replaces the length serializer.
    #[must_use]
    pub fn with_length_serializer<L2>(self, length: L2) -> Seq<T, S, L2> {
        Seq {
            element: self.element,
            length,
            length_validator: self.length_validator,
            element_validator: self.element_validator,
            element_skipper: self.element_skipper,
            _marker: PhantomData,
        }
    }

    /// Validates the declared length before any element is decoded.
    #[must_use]
    pub fn with_length_validator(
        mut self,
        validator: impl Validator<usize> + 'static,
    ) -> Self {
        self.length_validator = Some(Box::new(validator));
        self
    }

    /// Validates every element right after it is decoded.
    #[must_use]
    pub fn with_element_validator(
        mut self,
        validator: impl Validator<T> + 'static,
    ) -> Self {
        self.element_validator = Some(Box::new(validator));
        self
    }

    /// Skips the remaining elements when a validator rejects.
    #[must_use]
    pub fn with_element_skipper(
        mut self,
        skipper: impl Skipper + 'static,
    ) -> Self {
        self.element_skipper = Some(Box::new(skipper));
        self
    }

    fn skippers(&self) -> Option<[&dyn Skipper; 1]> {
        self.element_skipper.as_deref().map(|skipper| [skipper])
    }
}

impl<T, S: std::fmt::Debug, L: std::fmt::Debug> std::fmt::Debug
    for Seq<T, S, L>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seq")
            .field("element", &self.element)
            .field("length", &self.length)
            .field("length_validator", &self.length_validator.is_some())
            .field("element_validator", &self.element_validator.is_some())
            .field("element_skipper", &self.element_skipper.is_some())
            .finish()
    }
}

impl<T, S: Skipper, L: Serializer<isize>> Skipper for Seq<T, S, L> {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let (length, n) = read_length(&self.length, buf)?;
        let element: &dyn Skipper = &self.element;
        let skipped = skip_units(&buf[n..], length, [element])
            .map_err(|e| e.shift(n))?;
        Ok(n + skipped)
    }
}

impl<T, S: Serializer<T>, L: Serializer<isize>> Serializer<Vec<T>>
    for Seq<T, S, L>
{
    fn marshal(&self, value: &Vec<T>, buf: &mut [u8]) -> usize {
        let mut n = marshal_length(&self.length, value.len(), buf);
        for element in value {
            n += self.element.marshal(element, &mut buf[n..]);
        }
        n
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Vec<T>> {
        let (length, mut n) = read_length(&self.length, buf)?;

        if let Err(error) = validate(self.length_validator.as_deref(), &length)
        {
            return Err(reject(buf, n, error, length, self.skippers()));
        }

        // the declared length is untrusted until the elements are read
        let mut elements = Vec::with_capacity(length.min(buf.len() - n));
        for i in 0..length {
            let (element, m) = self
                .element
                .unmarshal(&buf[n..])
                .map_err(|e| e.shift(n))?;
            n += m;

            if let Err(error) =
                validate(self.element_validator.as_deref(), &element)
            {
                return Err(reject(
                    buf,
                    n,
                    error,
                    length - i - 1,
                    self.skippers(),
                ));
            }
            elements.push(element);
        }

        Ok((elements, n))
    }

    fn size(&self, value: &Vec<T>) -> usize {
        value.iter().fold(size_length(&self.length, value.len()), |n, e| {
            n + self.element.size(e)
        })
    }
}
