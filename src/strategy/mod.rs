//! Storage family implementations behind the dictionary handle.
//!
//! Each method maps onto one of three families ([`Method::family`]): the
//! chained hash table, the skiplist, or the doubly-linked sequence. [`Repr`]
//! is the closed sum over their states; the dictionary dispatches every
//! operation over it with a match. Key-dependent operations take the
//! discipline as a parameter; the families themselves never store one.
//!
//! [`Method::family`]: crate::method::Method

pub(crate) mod hash;
pub(crate) mod seq;
pub(crate) mod skip;

use crate::index::Idx;

pub(crate) use hash::HashTable;
pub(crate) use seq::SeqList;
pub(crate) use skip::SkipTable;

/// The state of one storage family, owning its node pool.
#[derive(Debug)]
pub(crate) enum Repr<T> {
    Hash(HashTable<T>),
    Skip(SkipTable<T>),
    Seq(SeqList<T>),
}

impl<T> Repr<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Repr::Hash(t) => t.len(),
            Repr::Skip(t) => t.len(),
            Repr::Seq(t) => t.len(),
        }
    }

    pub(crate) fn get(&self, idx: Idx) -> Option<&T> {
        match self {
            Repr::Hash(t) => t.get(idx),
            Repr::Skip(t) => t.get(idx),
            Repr::Seq(t) => t.get(idx),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        match self {
            Repr::Hash(t) => t.get_mut(idx),
            Repr::Skip(t) => t.get_mut(idx),
            Repr::Seq(t) => t.get_mut(idx),
        }
    }

    /// First node in the family's natural order.
    pub(crate) fn first(&self) -> Option<Idx> {
        match self {
            Repr::Hash(t) => t.first(),
            Repr::Skip(t) => t.first(),
            Repr::Seq(t) => t.first(),
        }
    }

    /// Last node in the family's natural order.
    pub(crate) fn last(&self) -> Option<Idx> {
        match self {
            Repr::Hash(t) => t.last(),
            Repr::Skip(t) => t.last(),
            Repr::Seq(t) => t.last(),
        }
    }

    /// Successor in the family's natural order. Key-independent for every
    /// family.
    pub(crate) fn next(&self, idx: Idx) -> Option<Idx> {
        match self {
            Repr::Hash(t) => t.next(idx),
            Repr::Skip(t) => t.next(idx),
            Repr::Seq(t) => t.next(idx),
        }
    }

    pub(crate) fn clear_with(&mut self, retire: impl FnMut(T)) {
        match self {
            Repr::Hash(t) => t.clear_with(retire),
            Repr::Skip(t) => t.clear_with(retire),
            Repr::Seq(t) => t.clear_with(retire),
        }
    }

    /// Consumes the node at `idx` for a front-to-back drain.
    pub(crate) fn detach_step(&mut self, idx: Idx) -> (T, Idx) {
        match self {
            Repr::Hash(t) => t.detach_step(idx),
            Repr::Skip(t) => t.detach_step(idx),
            Repr::Seq(t) => t.detach_step(idx),
        }
    }

    /// Approximate heap footprint in bytes.
    pub(crate) fn space(&self) -> usize {
        match self {
            Repr::Hash(t) => t.space(),
            Repr::Skip(t) => t.space(),
            Repr::Seq(t) => t.space(),
        }
    }
}
