//! Knit Serialization Library
//!
//! This crate provides composable serializers for a compact binary format.
//! A serializer is a plain value that knows how to marshal, unmarshal,
//! measure and skip values of one type; larger serializers are assembled
//! from smaller ones.
//!
//! # Overview
//!
//! - [`varint`]: base-128 integers and the zigzag transform for signed ones.
//! - [`raw`]: fixed-width little-endian primitives, booleans, chars and
//!   options.
//! - [`container`]: length-prefixed sequences, maps, strings, byte blocks
//!   and fixed-size arrays, with validators and recovery from rejected
//!   input.
//! - [`graph`]: pointers with shared and cyclic targets, encoded by
//!   identity.
//!
//! Every operation works on a byte slice already in memory. Callers chain
//! values by re-slicing at the byte count each call returns; no serializer
//! keeps a cursor between calls.
//!
//! # Example
//!
//! ```ignore
//! use knit_serialize::{
//!     Serializer,
//!     container::{Map, Seq, Str},
//!     serializer::to_vec,
//!     varint::ZigZag,
//! };
//!
//! let ser = Map::new(Str::new(), Seq::new(ZigZag::<i64>::new()));
//! let value = std::collections::BTreeMap::from([
//!     ("primes".to_owned(), vec![2, 3, 5]),
//!     ("signs".to_owned(), vec![-1, 1]),
//! ]);
//!
//! let bytes = to_vec(&ser, &value);
//! let (decoded, n) = ser.unmarshal(&bytes)?;
//!
//! assert_eq!(decoded, value);
//! assert_eq!(n, bytes.len());
//! ```

pub mod container;
pub mod error;
pub mod graph;
pub mod raw;
pub mod serializer;
pub mod validator;
pub mod varint;

pub use error::{DecodeError, DecodeResult, Error, SkipResult, ValidationError};
pub use serializer::{Serializer, Skipper, Validator, to_vec};
