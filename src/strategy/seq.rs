//! Sequence family: a doubly-linked list over the node pool.
//!
//! Backs the `List`, `Stack`, `Queue`, and `Deque` methods. Nodes embed
//! their own prev/next indices, so removal by handle is O(1); key search is
//! a linear scan with the discipline's comparator. The method-specific
//! policies (which end insert, append, and unspecified delete act on) live
//! in the dictionary layer — the list itself only knows ends and links.

use slab::Slab;

use crate::discipline::Discipline;
use crate::index::Idx;

#[derive(Debug)]
pub(crate) struct SeqNode<T> {
    pub(crate) obj: T,
    next: Idx,
    prev: Idx,
}

/// Doubly-linked list with head/tail access over pool-resident nodes.
#[derive(Debug)]
pub(crate) struct SeqList<T> {
    nodes: Slab<SeqNode<T>>,
    head: Idx,
    tail: Idx,
}

impl<T> SeqList<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Slab::new(),
            head: Idx::NONE,
            tail: Idx::NONE,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn first(&self) -> Option<Idx> {
        self.head.get()
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<Idx> {
        self.tail.get()
    }

    #[inline]
    pub(crate) fn get(&self, idx: Idx) -> Option<&T> {
        self.nodes.get(idx.as_usize()).map(|n| &n.obj)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        self.nodes.get_mut(idx.as_usize()).map(|n| &mut n.obj)
    }

    #[inline]
    pub(crate) fn next(&self, idx: Idx) -> Option<Idx> {
        self.nodes.get(idx.as_usize()).and_then(|n| n.next.get())
    }

    #[inline]
    pub(crate) fn prev(&self, idx: Idx) -> Option<Idx> {
        self.nodes.get(idx.as_usize()).and_then(|n| n.prev.get())
    }

    pub(crate) fn push_front(&mut self, obj: T) -> Idx {
        let idx = Idx::from_usize(self.nodes.insert(SeqNode {
            obj,
            next: self.head,
            prev: Idx::NONE,
        }));
        if let Some(old) = self.head.get() {
            self.nodes[old.as_usize()].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
        idx
    }

    pub(crate) fn push_back(&mut self, obj: T) -> Idx {
        let idx = Idx::from_usize(self.nodes.insert(SeqNode {
            obj,
            next: Idx::NONE,
            prev: self.tail,
        }));
        if let Some(old) = self.tail.get() {
            self.nodes[old.as_usize()].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
        idx
    }

    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let idx = self.head.get()?;
        Some(self.remove(idx).expect("head not in pool"))
    }

    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let idx = self.tail.get()?;
        Some(self.remove(idx).expect("tail not in pool"))
    }

    /// Unlinks and returns the node at `idx`, or `None` if the slot is
    /// vacant.
    pub(crate) fn remove(&mut self, idx: Idx) -> Option<T> {
        if !self.nodes.contains(idx.as_usize()) {
            return None;
        }
        let node = self.nodes.remove(idx.as_usize());
        match node.prev.get() {
            Some(p) => self.nodes[p.as_usize()].next = node.next,
            None => self.head = node.next,
        }
        match node.next.get() {
            Some(n) => self.nodes[n.as_usize()].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.obj)
    }

    /// Consumes the node at `idx` without relinking neighbors, returning
    /// the object and the successor. Only valid while draining the whole
    /// structure front to back; the list is unusable afterwards.
    pub(crate) fn detach_step(&mut self, idx: Idx) -> (T, Idx) {
        let node = self.nodes.remove(idx.as_usize());
        (node.obj, node.next)
    }

    /// Replaces the object at `idx`, returning the old one. The links are
    /// untouched, so the position in the sequence is preserved.
    pub(crate) fn replace(&mut self, idx: Idx, obj: T) -> T {
        let node = &mut self.nodes[idx.as_usize()];
        core::mem::replace(&mut node.obj, obj)
    }

    /// Linear scan from the head for the first object matching `key`.
    pub(crate) fn find<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let mut at = self.head;
        while let Some(idx) = at.get() {
            let node = &self.nodes[idx.as_usize()];
            if disc.compare(disc.key(&node.obj), key).is_eq() {
                return Some(idx);
            }
            at = node.next;
        }
        None
    }

    pub(crate) fn clear_with(&mut self, mut retire: impl FnMut(T)) {
        let mut at = self.head;
        while let Some(idx) = at.get() {
            let node = self.nodes.remove(idx.as_usize());
            retire(node.obj);
            at = node.next;
        }
        self.head = Idx::NONE;
        self.tail = Idx::NONE;
        debug_assert!(self.nodes.is_empty());
    }

    /// Approximate heap footprint of the structure in bytes.
    pub(crate) fn space(&self) -> usize {
        self.nodes.capacity() * core::mem::size_of::<SeqNode<T>>()
            + core::mem::size_of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discipline::Natural;

    fn collect(list: &SeqList<u64>) -> Vec<u64> {
        let mut out = Vec::new();
        let mut at = list.first();
        while let Some(idx) = at {
            out.push(*list.get(idx).unwrap());
            at = list.next(idx);
        }
        out
    }

    #[test]
    fn push_both_ends() {
        let mut list = SeqList::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn pop_both_ends() {
        let mut list = SeqList::new();
        for v in [1u64, 2, 3] {
            list.push_back(v);
        }
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn remove_middle_relinks() {
        let mut list = SeqList::new();
        let _a = list.push_back(1u64);
        let b = list.push_back(2);
        let _c = list.push_back(3);
        assert_eq!(list.remove(b), Some(2));
        assert_eq!(collect(&list), vec![1, 3]);
        assert_eq!(list.remove(b), None);
    }

    #[test]
    fn find_is_first_match() {
        let mut list = SeqList::new();
        list.push_back(5u64);
        let first_seven = list.push_back(7);
        list.push_back(7);
        assert_eq!(list.find(&Natural, &7), Some(first_seven));
        assert_eq!(list.find(&Natural, &9), None);
    }

    #[test]
    fn replace_keeps_position() {
        let mut list = SeqList::new();
        list.push_back(1u64);
        let b = list.push_back(2);
        list.push_back(3);
        assert_eq!(list.replace(b, 20), 2);
        assert_eq!(collect(&list), vec![1, 20, 3]);
    }

    #[test]
    fn clear_retires_everything() {
        let mut list = SeqList::new();
        for v in [1u64, 2, 3] {
            list.push_back(v);
        }
        let mut retired = Vec::new();
        list.clear_with(|v| retired.push(v));
        assert_eq!(retired, vec![1, 2, 3]);
        assert_eq!(list.len(), 0);
        assert!(list.first().is_none());
    }
}
