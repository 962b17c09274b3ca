use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use tracing::trace;

use super::{MAPPING, NIL, Ptr, Tables};
use crate::{
    error::{DecodeError, DecodeResult, Error, SkipResult},
    serializer::{Serializer, Skipper},
    varint,
};

/// Serializes a [`Ptr<T>`] by identity, delegating the pointee to `S`.
///
/// `S` may itself contain further `PtrSer`s built from the same
/// [`Tables`]; that is how a recursive structure such as a linked list
/// describes its `next` field.
///
/// # Panics
///
/// Every operation panics unless it runs inside a [`Graph`](super::Graph)
/// call on the same tables.
pub struct PtrSer<T, S> {
    base: S,
    tables: Tables,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> PtrSer<T, S> {
    /// Creates a pointer serializer whose pointees are encoded with `base`.
    #[must_use]
    pub fn new(base: S, tables: &Tables) -> Self {
        Self { base, tables: tables.clone(), _marker: PhantomData }
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for PtrSer<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtrSer")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Reads the mapping ID following a `MAPPING` tag.
fn read_id(buf: &[u8]) -> DecodeResult<u64> {
    let (id, n) =
        varint::unmarshal::<u64>(&buf[1..]).map_err(|e| e.shift(1))?;
    Ok((id, n + 1))
}

impl<T, S: Skipper> Skipper for PtrSer<T, S> {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        self.tables.expect_session();

        match buf.first() {
            Some(&NIL) => Ok(1),
            Some(&MAPPING) => {
                let (id, n) = read_id(buf)?;
                if !self.tables.mark_skipped(id) {
                    return Ok(n);
                }
                let m = self.base.skip(&buf[n..]).map_err(|e| e.shift(n))?;
                Ok(n + m)
            }
            Some(&tag) => Err(DecodeError::new(1, Error::WrongFormat(tag))),
            None => Err(DecodeError::new(0, Error::TooSmallInput)),
        }
    }
}

impl<T: Default + 'static, S: Serializer<T>> Serializer<Ptr<T>>
    for PtrSer<T, S>
{
    fn marshal(&self, value: &Ptr<T>, buf: &mut [u8]) -> usize {
        self.tables.expect_session();

        let Some(object) = value else {
            buf[0] = NIL;
            return 1;
        };

        let (id, first) = self.tables.assign(object);
        buf[0] = MAPPING;
        let n = 1 + varint::marshal(id, &mut buf[1..]);

        if !first {
            return n;
        }

        trace!(id, "assigned mapping id");
        n + self.base.marshal(&object.borrow(), &mut buf[n..])
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Ptr<T>> {
        self.tables.expect_session();

        match buf.first() {
            Some(&NIL) => return Ok((None, 1)),
            Some(&MAPPING) => {}
            Some(&tag) => {
                return Err(DecodeError::new(1, Error::WrongFormat(tag)));
            }
            None => return Err(DecodeError::new(0, Error::TooSmallInput)),
        }

        let (id, n) = read_id(buf)?;

        if let Some(object) = self.tables.resolve(id) {
            trace!(id, "resolved back-reference");
            return object
                .downcast::<RefCell<T>>()
                .map(|object| (Some(object), n))
                .map_err(|_| {
                    DecodeError::new(n, Error::ReferenceTypeMismatch { id })
                });
        }

        // registered before the payload so that cycles back to this object
        // resolve to the slot
        let slot = Rc::new(RefCell::new(T::default()));
        self.tables.register(id, slot.clone());
        trace!(id, "registered mapping id");

        let (value, m) =
            self.base.unmarshal(&buf[n..]).map_err(|e| e.shift(n))?;
        *slot.borrow_mut() = value;

        Ok((Some(slot), n + m))
    }

    fn size(&self, value: &Ptr<T>) -> usize {
        self.tables.expect_session();

        let Some(object) = value else {
            return 1;
        };

        let (id, first) = self.tables.assign(object);
        let n = 1 + varint::size(id);

        if first { n + self.base.size(&object.borrow()) } else { n }
    }
}
