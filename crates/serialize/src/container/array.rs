//! Fixed-size array serializer.

use std::marker::PhantomData;

use super::{
    DefaultLength, LengthValidator, marshal_length, read_length, reject,
    size_length, skip_units, validate,
};
use crate::{
    error::{DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper, Validator},
};

/// Serializes a `[T; N]` with the same framing as a sequence.
///
/// The array always marshals all `N` elements. On decode a declared length
/// above `N` is rejected with [`Error::TooLargeLength`] through the same
/// recovery path as a length validator, while a shorter one is accepted and
/// the missing tail is filled with `T::default()`.
pub struct Array<T, S, const N: usize, L = DefaultLength> {
    element: S,
    length: L,
    length_validator: Option<LengthValidator>,
    element_validator: Option<Box<dyn Validator<T>>>,
    element_skipper: Option<Box<dyn Skipper>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S, const N: usize> Array<T, S, N> {
    /// Creates an array serializer from an element serializer.
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

impl<T, S, const N: usize, L> Array<T, S, N, L> {
    /// Replaces the length serializer.
    #[must_use]
    pub fn with_length_serializer<L2>(self, length: L2) -> Array<T, S, N, L2> {
        Array {
            element: self.element,
            length,
            length_validator: self.length_validator,
            element_validator: self.element_validator,
            element_skipper: self.element_skipper,
            _marker: PhantomData,
        }
    }

    /// Validates the declared length once it is known to fit `N`.
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

    /// Skips the remaining elements when the length or an element is
    /// rejected.
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

impl<T, S: std::fmt::Debug, const N: usize, L: std::fmt::Debug> std::fmt::Debug
    for Array<T, S, N, L>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("capacity", &N)
            .field("element", &self.element)
            .field("length", &self.length)
            .field("length_validator", &self.length_validator.is_some())
            .field("element_validator", &self.element_validator.is_some())
            .field("element_skipper", &self.element_skipper.is_some())
            .finish()
    }
}

impl<T, S: Skipper, const N: usize, L: Serializer<isize>> Skipper
    for Array<T, S, N, L>
{
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let (length, n) = read_length(&self.length, buf)?;
        let element: &dyn Skipper = &self.element;
        let skipped = skip_units(&buf[n..], length, [element])
            .map_err(|e| e.shift(n))?;
        Ok(n + skipped)
    }
}

impl<T, S, const N: usize, L> Serializer<[T; N]> for Array<T, S, N, L>
where
    T: Default,
    S: Serializer<T>,
    L: Serializer<isize>,
{
    fn marshal(&self, value: &[T; N], buf: &mut [u8]) -> usize {
        let mut n = marshal_length(&self.length, N, buf);
        for element in value {
            n += self.element.marshal(element, &mut buf[n..]);
        }
        n
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<[T; N]> {
        let (length, mut n) = read_length(&self.length, buf)?;

        if length > N {
            let error = Error::TooLargeLength { length, max: N };
            return Err(reject(buf, n, error, length, self.skippers()));
        }
        if let Err(error) = validate(self.length_validator.as_deref(), &length)
        {
            return Err(reject(buf, n, error, length, self.skippers()));
        }

        let mut elements = Vec::with_capacity(length);
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

        let mut elements = elements.into_iter();
        let array =
            std::array::from_fn(|_| elements.next().unwrap_or_default());
        Ok((array, n))
    }

    fn size(&self, value: &[T; N]) -> usize {
        value.iter().fold(size_length(&self.length, N), |n, e| {
            n + self.element.size(e)
        })
    }
}
