//! Associative container serializer.
//!
//! Maps are written as a length prefix followed by `length` key/value pairs
//! in the map's iteration order. That order is unspecified for hash maps;
//! decoding preserves the entries, not their order.

use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

use super::{
    DefaultLength, LengthValidator, marshal_length, read_length, reject,
    size_length, skip_units, validate,
};
use crate::{
    error::{DecodeResult, SkipResult},
    serializer::{Serializer, Skipper, Validator},
};

/// A map type the [`Map`] serializer can read and write.
pub trait Associative<K, V> {
    /// Returns the number of entries.
    fn entry_count(&self) -> usize;

    /// Iterates over the entries in the map's natural order.
    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a;

    /// Creates an empty map with room for `capacity` entries.
    fn with_capacity(capacity: usize) -> Self;

    /// Inserts an entry, replacing any previous value for `key`.
    fn insert_entry(&mut self, key: K, value: V);
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> Associative<K, V>
    for HashMap<K, V, S>
{
    fn entry_count(&self) -> usize { self.len() }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: K, value: V) { self.insert(key, value); }
}

impl<K: Ord, V> Associative<K, V> for BTreeMap<K, V> {
    fn entry_count(&self) -> usize { self.len() }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }

    fn with_capacity(_capacity: usize) -> Self { Self::new() }

    fn insert_entry(&mut self, key: K, value: V) { self.insert(key, value); }
}

/// Serializes an [`Associative`] map as a length prefix followed by its
/// key/value pairs.
///
/// Recovery needs both a key skipper and a value skipper; with only one of
/// them configured, a rejection stops at the point of failure.
pub struct Map<K, V, KS, VS, L = DefaultLength> {
    key: KS,
    value: VS,
    length: L,
    length_validator: Option<LengthValidator>,
    key_validator: Option<Box<dyn Validator<K>>>,
    value_validator: Option<Box<dyn Validator<V>>>,
    key_skipper: Option<Box<dyn Skipper>>,
    value_skipper: Option<Box<dyn Skipper>>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, KS, VS> Map<K, V, KS, VS> {
    /// Creates a map serializer from a key and a value serializer.
    #[must_use]
    pub fn new(key: KS, value: VS) -> Self {
        Self {
            key,
            value,
            length: DefaultLength::new(),
            length_validator: None,
            key_validator: None,
            value_validator: None,
            key_skipper: None,
            value_skipper: None,
            _marker: PhantomData,
        }
    }
}

impl<K, V, KS, VS, L> Map<K, V, KS, VS, L> {
    /// Replaces the length serializer.
    #[must_use]
    pub fn with_length_serializer<L2>(
        self,
        length: L2,
    ) -> Map<K, V, KS, VS, L2> {
        Map {
            key: self.key,
            value: self.value,
            length,
            length_validator: self.length_validator,
            key_validator: self.key_validator,
            value_validator: self.value_validator,
            key_skipper: self.key_skipper,
            value_skipper: self.value_skipper,
            _marker: PhantomData,
        }
    }

    /// Validates the declared number of pairs before any pair is decoded.
    #[must_use]
    pub fn with_length_validator(
        mut self,
        validator: impl Validator<usize> + 'static,
    ) -> Self {
        self.length_validator = Some(Box::new(validator));
        self
    }

    /// Validates every key right after it is decoded.
    #[must_use]
    pub fn with_key_validator(
        mut self,
        validator: impl Validator<K> + 'static,
    ) -> Self {
        self.key_validator = Some(Box::new(validator));
        self
    }

    /// Validates every value right after it is decoded.
    #[must_use]
    pub fn with_value_validator(
        mut self,
        validator: impl Validator<V> + 'static,
    ) -> Self {
        self.value_validator = Some(Box::new(validator));
        self
    }

    /// Skips keys when a validator rejects.
    #[must_use]
    pub fn with_key_skipper(mut self, skipper: impl Skipper + 'static) -> Self {
        self.key_skipper = Some(Box::new(skipper));
        self
    }

    /// Skips values when a validator rejects.
    #[must_use]
    pub fn with_value_skipper(
        mut self,
        skipper: impl Skipper + 'static,
    ) -> Self {
        self.value_skipper = Some(Box::new(skipper));
        self
    }

    fn skippers(&self) -> Option<[&dyn Skipper; 2]> {
        self.key_skipper
            .as_deref()
            .zip(self.value_skipper.as_deref())
            .map(|(key, value)| [key, value])
    }
}

impl<K, V, KS: std::fmt::Debug, VS: std::fmt::Debug, L: std::fmt::Debug>
    std::fmt::Debug for Map<K, V, KS, VS, L>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("length", &self.length)
            .field("length_validator", &self.length_validator.is_some())
            .field("key_validator", &self.key_validator.is_some())
            .field("value_validator", &self.value_validator.is_some())
            .field("key_skipper", &self.key_skipper.is_some())
            .field("value_skipper", &self.value_skipper.is_some())
            .finish()
    }
}

impl<K, V, KS: Skipper, VS: Skipper, L: Serializer<isize>> Skipper
    for Map<K, V, KS, VS, L>
{
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let (length, n) = read_length(&self.length, buf)?;
        let key: &dyn Skipper = &self.key;
        let value: &dyn Skipper = &self.value;
        let skipped = skip_units(&buf[n..], length, [key, value])
            .map_err(|e| e.shift(n))?;
        Ok(n + skipped)
    }
}

impl<K, V, M, KS, VS, L> Serializer<M> for Map<K, V, KS, VS, L>
where
    M: Associative<K, V>,
    KS: Serializer<K>,
    VS: Serializer<V>,
    L: Serializer<isize>,
{
    fn marshal(&self, map: &M, buf: &mut [u8]) -> usize {
        let mut n = marshal_length(&self.length, map.entry_count(), buf);
        for (key, value) in map.entries() {
            n += self.key.marshal(key, &mut buf[n..]);
            n += self.value.marshal(value, &mut buf[n..]);
        }
        n
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<M> {
        let (length, mut n) = read_length(&self.length, buf)?;

        if let Err(error) = validate(self.length_validator.as_deref(), &length)
        {
            return Err(reject(buf, n, error, length, self.skippers()));
        }

        let mut map = M::with_capacity(length.min(buf.len() - n));
        for i in 0..length {
            let (key, m) =
                self.key.unmarshal(&buf[n..]).map_err(|e| e.shift(n))?;
            n += m;

            if let Err(error) = validate(self.key_validator.as_deref(), &key) {
                let Some(skippers @ [_, value_skipper]) = self.skippers() else {
                    return Err(reject::<2>(buf, n, error, 0, None));
                };
                // the rejected key's value has not been read yet
                match value_skipper.skip(&buf[n..]) {
                    Ok(m) => n += m,
                    Err(skip_error) => return Err(skip_error.shift(n)),
                }
                return Err(reject(
                    buf,
                    n,
                    error,
                    length - i - 1,
                    Some(skippers),
                ));
            }

            let (value, m) =
                self.value.unmarshal(&buf[n..]).map_err(|e| e.shift(n))?;
            n += m;

            if let Err(error) =
                validate(self.value_validator.as_deref(), &value)
            {
                return Err(reject(
                    buf,
                    n,
                    error,
                    length - i - 1,
                    self.skippers(),
                ));
            }

            map.insert_entry(key, value);
        }

        Ok((map, n))
    }

    fn size(&self, map: &M) -> usize {
        map.entries().fold(
            size_length(&self.length, map.entry_count()),
            |n, (key, value)| n + self.key.size(key) + self.value.size(value),
        )
    }
}

#[cfg(test)]
mod test;
