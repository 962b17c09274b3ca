use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::Rc,
};

use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Maps allocations to the IDs assigned to them on the encode side.
#[derive(Debug, Default)]
struct IdentityTable {
    ids: FxHashMap<usize, u64>,
}

impl IdentityTable {
    /// Returns the ID of `address` and whether it was assigned just now.
    fn lookup_or_assign(&mut self, address: usize) -> (u64, bool) {
        let next = self.ids.len() as u64 + 1;
        let id = *self.ids.entry(address).or_insert(next);
        (id, id == next)
    }
}

/// Maps IDs to the objects decoded for them on the decode side.
#[derive(Default)]
struct ReverseTable {
    objects: FxHashMap<u64, Rc<dyn Any>>,
    skipped: FxHashSet<u64>,
}

impl std::fmt::Debug for ReverseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReverseTable")
            .field("objects", &self.objects.len())
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Inner {
    identity: RefCell<IdentityTable>,
    reverse: RefCell<ReverseTable>,
    active: Cell<bool>,
}

/// The identity tables shared by the pointer serializers of one graph.
///
/// Cloning yields another handle to the same tables. Create one per graph
/// serializer and hand it to every [`PtrSer`](super::PtrSer) and to the
/// enclosing [`Graph`](super::Graph).
#[derive(Debug, Clone, Default)]
pub struct Tables {
    inner: Rc<Inner>,
}

impl Tables {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Opens a top-level session.
    ///
    /// # Panics
    ///
    /// Panics if a session is already open on these tables, which happens
    /// when a graph serializer is called again from inside its own call.
    pub(crate) fn enter(&self) -> Session<'_> {
        assert!(
            !self.inner.active.get(),
            "graph serializer re-entered while a call on the same tables is \
             in progress; use separate `Tables` for independent graphs"
        );
        self.begin()
    }

    /// Asserts that a top-level session is open.
    ///
    /// # Panics
    ///
    /// Panics if no [`Graph`](super::Graph) call is in progress on these
    /// tables.
    pub(crate) fn expect_session(&self) {
        assert!(
            self.inner.active.get(),
            "pointer serializer called outside a graph serializer; wrap the \
             outermost serializer in `Graph` built from the same `Tables`"
        );
    }

    fn begin(&self) -> Session<'_> {
        self.inner.active.set(true);
        Session { tables: self }
    }

    /// Returns the mapping ID of the allocation behind `object` and whether
    /// this is its first occurrence in the current session.
    pub(crate) fn assign<T>(&self, object: &Rc<T>) -> (u64, bool) {
        let address = Rc::as_ptr(object).addr();
        self.inner.identity.borrow_mut().lookup_or_assign(address)
    }

    /// Returns the object decoded for `id` in the current session.
    pub(crate) fn resolve(&self, id: u64) -> Option<Rc<dyn Any>> {
        self.inner.reverse.borrow().objects.get(&id).cloned()
    }

    /// Registers a freshly allocated object under `id`.
    pub(crate) fn register(&self, id: u64, object: Rc<dyn Any>) {
        self.inner.reverse.borrow_mut().objects.insert(id, object);
    }

    /// Records that the payload of `id` has been skipped. Returns `false` if
    /// the payload was already consumed earlier in the session.
    pub(crate) fn mark_skipped(&self, id: u64) -> bool {
        let mut reverse = self.inner.reverse.borrow_mut();
        !reverse.objects.contains_key(&id) && reverse.skipped.insert(id)
    }

    fn reset(&self) {
        let mut identity = self.inner.identity.borrow_mut();
        let mut reverse = self.inner.reverse.borrow_mut();

        debug!(
            assigned = identity.ids.len(),
            decoded = reverse.objects.len(),
            skipped = reverse.skipped.len(),
            "resetting graph tables"
        );

        identity.ids.clear();
        reverse.objects.clear();
        reverse.skipped.clear();
        self.inner.active.set(false);
    }
}

/// An open session on [`Tables`]; the tables are reset when it drops.
#[derive(Debug)]
pub(crate) struct Session<'a> {
    tables: &'a Tables,
}

impl Drop for Session<'_> {
    fn drop(&mut self) { self.tables.reset(); }
}
