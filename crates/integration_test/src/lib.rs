//! Shared fixture types and serializers for the knit integration tests.
//!
//! The graph fixtures describe their pointer fields with
//! [`PtrSer`]s built from the serializer's own [`Tables`], the way a real
//! recursive type would.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]

use std::{cell::RefCell, rc::Rc};

use knit_serialize::{
    DecodeResult, Serializer, SkipResult, Skipper,
    container::Str,
    graph::{Graph, Ptr, PtrSer, Tables},
    varint::{Varint, ZigZag},
};

/// Allocates a pointer to `value`.
pub fn ptr<T>(value: T) -> Ptr<T> { Some(Rc::new(RefCell::new(value))) }

/// Follows a non-nil pointer.
///
/// # Panics
///
/// Panics if `pointer` is nil.
pub fn deref<T>(pointer: &Ptr<T>) -> &Rc<RefCell<T>> {
    pointer.as_ref().expect("pointer should not be nil")
}

// ============================================================================
// Linked Nodes
// ============================================================================

/// A singly linked node; the links may form a cycle.
#[derive(Debug, Default)]
pub struct Node {
    pub value: i64,
    pub next: Ptr<Node>,
}

#[derive(Debug)]
pub struct NodeSer {
    tables: Tables,
}

impl NodeSer {
    pub fn new(tables: &Tables) -> Self { Self { tables: tables.clone() } }

    fn next(&self) -> PtrSer<Node, &Self> { PtrSer::new(self, &self.tables) }
}

impl Skipper for NodeSer {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let n = ZigZag::<i64>::new().skip(buf)?;
        let m = self.next().skip(&buf[n..]).map_err(|e| e.shift(n))?;
        Ok(n + m)
    }
}

impl Serializer<Node> for NodeSer {
    fn marshal(&self, node: &Node, buf: &mut [u8]) -> usize {
        let n = ZigZag::<i64>::new().marshal(&node.value, buf);
        n + self.next().marshal(&node.next, &mut buf[n..])
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Node> {
        let (value, n) = ZigZag::<i64>::new().unmarshal(buf)?;
        let (next, m) =
            self.next().unmarshal(&buf[n..]).map_err(|e| e.shift(n))?;
        Ok((Node { value, next }, n + m))
    }

    fn size(&self, node: &Node) -> usize {
        ZigZag::<i64>::new().size(&node.value) + self.next().size(&node.next)
    }
}

/// The top-level serializer of a node list.
pub type ListSer = Graph<PtrSer<Node, NodeSer>>;

pub fn list_serializer() -> ListSer {
    let tables = Tables::new();
    Graph::new(PtrSer::new(NodeSer::new(&tables), &tables), &tables)
}

/// Builds the nodes `values[0] -> values[1] -> ...`, linking the last node
/// back to `values[back_to]` when given.
pub fn linked(values: &[i64], back_to: Option<usize>) -> Vec<Ptr<Node>> {
    let nodes: Vec<_> = values
        .iter()
        .map(|&value| ptr(Node { value, next: None }))
        .collect();

    for (node, next) in nodes.iter().zip(nodes.iter().skip(1)) {
        deref(node).borrow_mut().next.clone_from(next);
    }
    if let (Some(last), Some(target)) = (nodes.last(), back_to) {
        deref(last).borrow_mut().next.clone_from(&nodes[target]);
    }

    nodes
}

/// Walks `count` links from `start`, collecting the pointers visited.
pub fn walk(start: &Ptr<Node>, count: usize) -> Vec<Ptr<Node>> {
    let mut visited = Vec::with_capacity(count);
    let mut current = start.clone();
    for _ in 0..count {
        let next = deref(&current).borrow().next.clone();
        visited.push(current);
        current = next;
    }
    visited
}

/// Cuts every link so a cyclic list can be freed.
pub fn unlink(nodes: &[Ptr<Node>]) {
    for node in nodes.iter().flatten() {
        node.borrow_mut().next = None;
    }
}

// ============================================================================
// Shared Leaves
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub label: String,
    pub weight: u32,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LeafSer;

impl Skipper for LeafSer {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let n = Str::new().skip(buf)?;
        let m = Varint::<u32>::new()
            .skip(&buf[n..])
            .map_err(|e| e.shift(n))?;
        Ok(n + m)
    }
}

impl Serializer<Leaf> for LeafSer {
    fn marshal(&self, leaf: &Leaf, buf: &mut [u8]) -> usize {
        let n = Str::new().marshal(&leaf.label, buf);
        n + Varint::<u32>::new().marshal(&leaf.weight, &mut buf[n..])
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Leaf> {
        let (label, n) = Str::new().unmarshal(buf)?;
        let (weight, m) = Varint::<u32>::new()
            .unmarshal(&buf[n..])
            .map_err(|e| e.shift(n))?;
        Ok((Leaf { label, weight }, n + m))
    }

    fn size(&self, leaf: &Leaf) -> usize {
        Str::new().size(&leaf.label)
            + Varint::<u32>::new().size(&leaf.weight)
    }
}

/// Two pointers that may name the same leaf.
#[derive(Debug, Default)]
pub struct Pair {
    pub left: Ptr<Leaf>,
    pub right: Ptr<Leaf>,
}

#[derive(Debug)]
pub struct PairSer {
    leaf: PtrSer<Leaf, LeafSer>,
}

impl PairSer {
    pub fn new(tables: &Tables) -> Self {
        Self { leaf: PtrSer::new(LeafSer, tables) }
    }
}

impl Skipper for PairSer {
    fn skip(&self, buf: &[u8]) -> SkipResult {
        let n = self.leaf.skip(buf)?;
        let m = self.leaf.skip(&buf[n..]).map_err(|e| e.shift(n))?;
        Ok(n + m)
    }
}

impl Serializer<Pair> for PairSer {
    fn marshal(&self, pair: &Pair, buf: &mut [u8]) -> usize {
        let n = self.leaf.marshal(&pair.left, buf);
        n + self.leaf.marshal(&pair.right, &mut buf[n..])
    }

    fn unmarshal(&self, buf: &[u8]) -> DecodeResult<Pair> {
        let (left, n) = self.leaf.unmarshal(buf)?;
        let (right, m) =
            self.leaf.unmarshal(&buf[n..]).map_err(|e| e.shift(n))?;
        Ok((Pair { left, right }, n + m))
    }

    fn size(&self, pair: &Pair) -> usize {
        self.leaf.size(&pair.left) + self.leaf.size(&pair.right)
    }
}

pub fn pair_serializer() -> Graph<PairSer> {
    let tables = Tables::new();
    Graph::new(PairSer::new(&tables), &tables)
}
