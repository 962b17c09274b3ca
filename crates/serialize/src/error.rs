//! Error types shared by every serializer.
//!
//! Decoding, sizing and skipping report failures as ordinary values through
//! [`DecodeError`]. Marshalling never returns an error: writing into a buffer
//! smaller than [`Serializer::size`](crate::Serializer::size) is a contract
//! violation and panics.

/// A boxed, caller-defined error produced by a
/// [`Validator`](crate::Validator).
pub type ValidationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kind of failure encountered while reading encoded bytes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The buffer ended before a value could be fully read.
    #[error("input buffer is too small")]
    TooSmallInput,

    /// A varint carries more precision than the target width can hold.
    #[error("varint overflows the target integer width")]
    Overflow,

    /// A length prefix decoded to a negative number.
    #[error("negative length")]
    NegativeLength,

    /// A declared length exceeds a fixed capacity or a caller-supplied bound.
    #[error("length {length} exceeds the maximum of {max}")]
    TooLargeLength {
        /// The declared length.
        length: usize,
        /// The largest accepted length.
        max: usize,
    },

    /// An unrecognized tag byte.
    #[error("unexpected tag byte {0:#04x}")]
    WrongFormat(u8),

    /// A string payload is not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// A decoded scalar is not a Unicode scalar value.
    #[error("invalid Unicode scalar value: {0}")]
    InvalidChar(u32),

    /// A back-reference points at an object decoded as a different type.
    #[error("reference {id} resolves to an object of a different type")]
    ReferenceTypeMismatch {
        /// The mapping ID read from the input.
        id: u64,
    },

    /// A validator rejected a decoded value or length.
    #[error("validation failed: {0}")]
    Validation(#[source] ValidationError),
}

/// A decoding failure together with the number of bytes consumed before the
/// call returned.
///
/// The count is meaningful on the error path: validated containers use it to
/// report where the encoded container ends even when they reject its
/// contents, so a caller can resume at the next sibling value.
#[derive(Debug, thiserror::Error)]
#[error("{error} (after {n} bytes)")]
pub struct DecodeError {
    n: usize,
    #[source]
    error: Error,
}

impl DecodeError {
    /// Creates a new error that consumed `n` bytes.
    #[must_use]
    pub const fn new(n: usize, error: Error) -> Self { Self { n, error } }

    /// Returns the number of bytes consumed before the failure.
    #[must_use]
    pub const fn n(&self) -> usize { self.n }

    /// Returns the kind of failure.
    #[must_use]
    pub const fn error(&self) -> &Error { &self.error }

    /// Adds the bytes an enclosing serializer consumed before delegating to
    /// the call that failed.
    #[must_use]
    pub fn shift(mut self, prefix: usize) -> Self {
        self.n += prefix;
        self
    }

    /// Returns `true` if the failure is [`Error::TooSmallInput`].
    #[must_use]
    pub const fn is_too_small_input(&self) -> bool {
        matches!(self.error, Error::TooSmallInput)
    }

    /// Returns the validator's error if this failure came from a validator.
    #[must_use]
    pub fn validation(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        match &self.error {
            Error::Validation(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

/// The result of an unmarshal: the value and the bytes consumed.
pub type DecodeResult<T> = Result<(T, usize), DecodeError>;

/// The result of a skip: the bytes consumed.
pub type SkipResult = Result<usize, DecodeError>;
