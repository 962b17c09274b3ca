//! Ready-made validators.
//!
//! Any closure `Fn(&T) -> Result<(), ValidationError>` already works as a
//! [`Validator`]; this module only holds the ones common enough to name.
//!
//! A validator may reject with an [`Error`] boxed as a [`ValidationError`].
//! Containers surface such an error as itself rather than wrapping it in
//! [`Error::Validation`], so [`max_length`] reports
//! [`Error::TooLargeLength`] exactly like a fixed-size array does.

use crate::{
    error::{Error, ValidationError},
    serializer::Validator,
};

/// Rejects declared lengths above a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxLength {
    max: usize,
}

impl Validator<usize> for MaxLength {
    fn validate(&self, length: &usize) -> Result<(), ValidationError> {
        if *length > self.max {
            return Err(Box::new(Error::TooLargeLength {
                length: *length,
                max: self.max,
            }));
        }
        Ok(())
    }
}

/// Creates a length validator accepting at most `max` elements.
///
/// ```ignore
/// use knit_serialize::{container::Str, validator::max_length};
///
/// let ser = Str::new().with_length_validator(max_length(255));
/// ```
#[must_use]
pub const fn max_length(max: usize) -> MaxLength { MaxLength { max } }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_up_to_the_bound() {
        let validator = max_length(3);

        assert!(validator.validate(&0).is_ok());
        assert!(validator.validate(&3).is_ok());

        let error = validator.validate(&4).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::TooLargeLength { length: 4, max: 3 })
        ));
    }
}
