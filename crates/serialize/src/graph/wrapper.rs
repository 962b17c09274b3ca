use super::Tables;
use crate::{
    error::{DecodeResult, SkipResult},
    serializer::{Serializer, Skipper},
};

/// Marks the top-level call of a graph serializer.
///
/// Every operation opens a session on the tables for its duration and resets
/// them on return, so mapping IDs restart at `1` with each call.
///
/// # Panics
///
/// Every operation panics if it is invoked from inside another call on the
/// same tables.
pub struct Graph<S> {
    inner: S,
    tables: Tables,
}

impl<S> Graph<S> {
    /// Wraps `inner`, whose pointer serializers were built from `tables`.
    #[must_use]
    pub fn new(inner: S, tables: &Tables) -> Self {
        Self { inner, tables: tables.clone() }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Graph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("inner", &self.inner)
            .field("tables", &self.tables)
            .finish()
    }
}

impl<S: Skipper> Skipper for Graph<S> {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let _session = self.tables.enter();
        self.inner.skip(buf)
    }
}

impl<T, S: Serializer<T>> Serializer<T> for Graph<S> {
    fn marshal(&self, value: &T, buf: &mut [u8]) -> usize {
        let _session = self.tables.enter();
        self.inner.marshal(value, buf)
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<T> {
        let _session = self.tables.enter();
        self.inner.unmarshal(buf)
    }

    fn size(&self, value: &T) -> usize {
        let _session = self.tables.enter();
        self.inner.size(value)
    }
}
