//! Serialization of shared and cyclic pointer graphs.
//!
//! A plain serializer follows pointers blindly, so a shared sub-object is
//! written once per reference and a cycle never terminates. The graph codec
//! instead gives every distinct allocation a mapping ID the first time it is
//! reached and writes only the ID afterwards.
//!
//! # Wire Format
//!
//! ```text
//! nil pointer            => NIL
//! first occurrence       => MAPPING varint(id) payload
//! every later occurrence => MAPPING varint(id)
//! ```
//!
//! IDs are assigned in encounter order starting at `1`, afresh for every
//! top-level call.
//!
//! # Decoding
//!
//! The first occurrence of an ID allocates a default-initialized slot and
//! registers it under the ID *before* its payload is decoded. A payload that
//! refers back to its own ancestor (a cycle) therefore resolves to the slot
//! being filled in, and the slot receives its value once the payload is
//! complete.
//!
//! # Sessions
//!
//! [`PtrSer`]s created from the same [`Tables`] share the identity tables of
//! one top-level call. The [`Graph`] wrapper marks that call: it resets the
//! tables when the call returns, on success and on error alike, so one
//! wrapper can be reused for any number of sequential calls. Only the
//! wrapper opens a session; a pointer serializer invoked outside one panics
//! instead of assigning IDs that its siblings would never see.
//!
//! The tables are reference counted without synchronization, which makes
//! every graph serializer `!Send` and `!Sync`.
//!
//! # Example
//!
//! ```ignore
//! use knit_serialize::{container::Seq, graph::{Graph, PtrSer, Tables}};
//! use knit_serialize::varint::Varint;
//!
//! let tables = Tables::new();
//! let ser = Graph::new(
//!     Seq::new(PtrSer::new(Varint::<u32>::new(), &tables)),
//!     &tables,
//! );
//! ```

use std::{cell::RefCell, rc::Rc};

mod ptr;
mod table;
mod wrapper;

pub use ptr::PtrSer;
pub use table::Tables;
pub use wrapper::Graph;

/// Tag of a nil pointer.
pub const NIL: u8 = 0;

/// Tag of a pointer followed by its mapping ID.
pub const MAPPING: u8 = 1;

/// A nullable, shareable and mutable pointer, the shape the graph codec
/// reads and writes.
///
/// Identity is the allocation: two pointers are the same object when
/// [`Rc::ptr_eq`] holds.
pub type Ptr<T> = Option<Rc<RefCell<T>>>;
