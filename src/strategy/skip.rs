//! Ordered family: a skiplist over the node pool.
//!
//! Backs the `OrderedSet` and `OrderedBag` methods with expected O(log n)
//! insert, lookup, removal, and neighbor queries. Levels are drawn from a
//! geometric distribution (p = 0.5); the list keeps head pointers per level
//! plus a tail pointer for O(1) `last`.
//!
//! Duplicate keys are made totally ordered by a per-table monotone sequence
//! number compared after the discipline key. That gives the ordered bag its
//! stable (insertion-order) ties and, more usefully, makes every node
//! unique in the ordering — exact-identity removal and `prev` are then
//! plain O(log n) searches for `(key, seq)`, with no back links.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use slab::Slab;

use crate::discipline::Discipline;
use crate::index::Idx;

pub(crate) const MAX_LEVEL: usize = 16;

/// Seed for the level generator. Fixed so structure layout is reproducible;
/// level choice only affects performance, never results.
const LEVEL_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug)]
pub(crate) struct SkipNode<T> {
    pub(crate) obj: T,
    seq: u64,
    forward: [Idx; MAX_LEVEL],
    level: u8,
}

#[derive(Debug)]
pub(crate) struct SkipTable<T> {
    nodes: Slab<SkipNode<T>>,
    head: [Idx; MAX_LEVEL],
    tail: Idx,
    /// Highest level currently in use (0-based).
    level: usize,
    /// Next sequence number; starts at 1 so 0 orders below every node.
    seq: u64,
    rng: SmallRng,
}

impl<T> SkipTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Slab::new(),
            head: [Idx::NONE; MAX_LEVEL],
            tail: Idx::NONE,
            level: 0,
            seq: 1,
            rng: SmallRng::seed_from_u64(LEVEL_SEED),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn first(&self) -> Option<Idx> {
        self.head[0].get()
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
        self.nodes.get(idx.as_usize()).and_then(|n| n.forward[0].get())
    }

    /// Predecessor in key order: an exact `(key, seq)` search whose level-0
    /// update slot is the node just before `idx`.
    pub(crate) fn prev<D>(&self, disc: &D, idx: Idx) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let node = self.nodes.get(idx.as_usize())?;
        let mut update = [Idx::NONE; MAX_LEVEL];
        self.search(disc, disc.key(&node.obj), node.seq, &mut update);
        update[0].get()
    }

    /// Leftmost node whose key equals `key` (first of the tie run).
    pub(crate) fn find<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let idx = self.at_least(disc, key)?;
        let node = &self.nodes[idx.as_usize()];
        if disc.compare(disc.key(&node.obj), key).is_eq() {
            Some(idx)
        } else {
            None
        }
    }

    /// Leftmost node with key >= `key`.
    pub(crate) fn at_least<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let mut update = [Idx::NONE; MAX_LEVEL];
        self.search(disc, key, 0, &mut update).get()
    }

    /// Rightmost node with key <= `key`.
    pub(crate) fn at_most<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let mut update = [Idx::NONE; MAX_LEVEL];
        self.search(disc, key, u64::MAX, &mut update);
        update[0].get()
    }

    /// Inserts `obj`. With `unique`, an existing equal key rejects the new
    /// object; otherwise ties land after their equals (stable order).
    pub(crate) fn insert<D>(&mut self, disc: &D, obj: T, unique: bool) -> Result<Idx, (Idx, T)>
    where
        D: Discipline<T>,
    {
        let mut update = [Idx::NONE; MAX_LEVEL];
        if unique {
            let at = self.search(disc, disc.key(&obj), 0, &mut update);
            if let Some(found) = at.get() {
                let node = &self.nodes[found.as_usize()];
                if disc.compare(disc.key(&node.obj), disc.key(&obj)).is_eq() {
                    return Err((found, obj));
                }
            }
        } else {
            self.search(disc, disc.key(&obj), u64::MAX, &mut update);
        }
        Ok(self.link(obj, &update))
    }

    /// Insert-or-replace on the leftmost member of the tie run. The
    /// replaced object is returned; its node (and order position) survive.
    pub(crate) fn install<D>(&mut self, disc: &D, obj: T) -> (Idx, Option<T>)
    where
        D: Discipline<T>,
    {
        match self.find(disc, disc.key(&obj)) {
            Some(idx) => {
                let old = core::mem::replace(&mut self.nodes[idx.as_usize()].obj, obj);
                (idx, Some(old))
            }
            None => {
                let idx = self
                    .insert(disc, obj, false)
                    .unwrap_or_else(|_| unreachable!("non-unique insert cannot be rejected"));
                (idx, None)
            }
        }
    }

    /// Removes the leftmost member of the tie run for `key`.
    pub(crate) fn delete<D>(&mut self, disc: &D, key: &D::Key) -> Option<T>
    where
        D: Discipline<T>,
    {
        let idx = self.find(disc, key)?;
        self.remove(disc, idx)
    }

    /// Removes the exact node at `idx`, if present.
    pub(crate) fn remove<D>(&mut self, disc: &D, idx: Idx) -> Option<T>
    where
        D: Discipline<T>,
    {
        if !self.nodes.contains(idx.as_usize()) {
            return None;
        }
        let mut update = [Idx::NONE; MAX_LEVEL];
        {
            let node = &self.nodes[idx.as_usize()];
            let found = self.search(disc, disc.key(&node.obj), node.seq, &mut update);
            debug_assert_eq!(found, idx, "exact search must land on the node");
        }
        let node = &self.nodes[idx.as_usize()];
        let node_level = node.level as usize;
        let forward = node.forward;

        for (i, &next) in forward.iter().enumerate().take(node_level + 1) {
            match update[i].get() {
                Some(p) => self.nodes[p.as_usize()].forward[i] = next,
                None => self.head[i] = next,
            }
        }
        if self.tail == idx {
            self.tail = update[0];
        }
        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
        Some(self.nodes.remove(idx.as_usize()).obj)
    }

    /// Consumes the node at `idx` without relinking, returning the object
    /// and the level-0 successor. Only valid while draining the whole table
    /// in key order; the table is unusable afterwards.
    pub(crate) fn detach_step(&mut self, idx: Idx) -> (T, Idx) {
        let node = self.nodes.remove(idx.as_usize());
        (node.obj, node.forward[0])
    }

    pub(crate) fn clear_with(&mut self, mut retire: impl FnMut(T)) {
        let mut at = self.head[0];
        while let Some(idx) = at.get() {
            let node = self.nodes.remove(idx.as_usize());
            retire(node.obj);
            at = node.forward[0];
        }
        self.head = [Idx::NONE; MAX_LEVEL];
        self.tail = Idx::NONE;
        self.level = 0;
        debug_assert!(self.nodes.is_empty());
    }

    /// Approximate heap footprint of the structure in bytes.
    pub(crate) fn space(&self) -> usize {
        self.nodes.capacity() * core::mem::size_of::<SkipNode<T>>()
            + core::mem::size_of::<Self>()
    }

    /// Max level in use, 1-based. 0 for an empty table.
    pub(crate) fn height(&self) -> usize {
        if self.nodes.is_empty() { 0 } else { self.level + 1 }
    }

    /// Node levels (0-based), for the stat report.
    pub(crate) fn node_levels(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().map(|(_, n)| n.level as usize)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Node order relative to the `(key, seq)` probe target.
    #[inline]
    fn above_target<D>(&self, disc: &D, idx: Idx, key: &D::Key, seq: u64) -> bool
    where
        D: Discipline<T>,
    {
        let node = &self.nodes[idx.as_usize()];
        match disc.compare(disc.key(&node.obj), key) {
            core::cmp::Ordering::Less => false,
            core::cmp::Ordering::Greater => true,
            core::cmp::Ordering::Equal => node.seq >= seq,
        }
    }

    /// Descends from the top level filling `update` with the last node
    /// strictly below `(key, seq)` per level. Returns the level-0
    /// successor: the leftmost node at or above the target, or the
    /// sentinel.
    fn search<D>(&self, disc: &D, key: &D::Key, seq: u64, update: &mut [Idx; MAX_LEVEL]) -> Idx
    where
        D: Discipline<T>,
    {
        let mut current = Idx::NONE;
        for i in (0..=self.level).rev() {
            let mut next = match current.get() {
                Some(c) => self.nodes[c.as_usize()].forward[i],
                None => self.head[i],
            };
            while let Some(n) = next.get() {
                if self.above_target(disc, n, key, seq) {
                    break;
                }
                current = n;
                next = self.nodes[n.as_usize()].forward[i];
            }
            update[i] = current;
        }
        match current.get() {
            Some(c) => self.nodes[c.as_usize()].forward[0],
            None => self.head[0],
        }
    }

    /// Links a new node after the predecessors in `update`.
    fn link(&mut self, obj: T, update: &[Idx; MAX_LEVEL]) -> Idx {
        let level = self.random_level();
        let seq = self.seq;
        self.seq += 1;

        let mut forward = [Idx::NONE; MAX_LEVEL];
        for (i, slot) in forward.iter_mut().enumerate().take(level + 1) {
            *slot = match update[i].get() {
                Some(p) => self.nodes[p.as_usize()].forward[i],
                None => self.head[i],
            };
        }

        let idx = Idx::from_usize(self.nodes.insert(SkipNode {
            obj,
            seq,
            forward,
            level: level as u8,
        }));
        for i in 0..=level {
            match update[i].get() {
                Some(p) => self.nodes[p.as_usize()].forward[i] = idx,
                None => self.head[i] = idx,
            }
        }
        if forward[0].is_none() {
            self.tail = idx;
        }
        if level > self.level {
            self.level = level;
        }
        idx
    }

    /// Geometric level draw, p = 0.5, capped at `MAX_LEVEL - 1`.
    fn random_level(&mut self) -> usize {
        (self.rng.next_u64().trailing_ones() as usize).min(MAX_LEVEL - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discipline::{ByKey, Natural};

    fn keys(t: &SkipTable<u64>) -> Vec<u64> {
        let mut out = Vec::new();
        let mut at = t.first();
        while let Some(idx) = at {
            out.push(*t.get(idx).unwrap());
            at = t.next(idx);
        }
        out
    }

    #[test]
    fn ascending_traversal() {
        let mut t = SkipTable::new();
        for v in [5u64, 1, 3] {
            t.insert(&Natural, v, true).unwrap();
        }
        assert_eq!(keys(&t), vec![1, 3, 5]);
    }

    #[test]
    fn range_probes() {
        let mut t = SkipTable::new();
        for v in [5u64, 1, 3] {
            t.insert(&Natural, v, true).unwrap();
        }
        let al = t.at_least(&Natural, &2).unwrap();
        assert_eq!(t.get(al), Some(&3));
        let am = t.at_most(&Natural, &2).unwrap();
        assert_eq!(t.get(am), Some(&1));
        assert_eq!(t.at_least(&Natural, &6), None);
        assert_eq!(t.at_most(&Natural, &0), None);
    }

    #[test]
    fn probes_on_empty_are_not_found() {
        let t: SkipTable<u64> = SkipTable::new();
        assert_eq!(t.at_least(&Natural, &1), None);
        assert_eq!(t.at_most(&Natural, &1), None);
        assert_eq!(t.first(), None);
        assert_eq!(t.last(), None);
    }

    #[test]
    fn unique_rejects_duplicate() {
        let mut t = SkipTable::new();
        let a = t.insert(&Natural, 7u64, true).unwrap();
        match t.insert(&Natural, 7, true) {
            Err((existing, rejected)) => {
                assert_eq!(existing, a);
                assert_eq!(rejected, 7);
            }
            Ok(_) => panic!("duplicate accepted"),
        }
    }

    #[test]
    fn ties_are_stable() {
        fn key_of(p: &(u64, char)) -> &u64 {
            &p.0
        }
        let disc = ByKey::new(key_of as fn(&(u64, char)) -> &u64);
        let mut t = SkipTable::new();
        t.insert(&disc, (7, 'a'), false).unwrap();
        t.insert(&disc, (3, 'x'), false).unwrap();
        t.insert(&disc, (7, 'b'), false).unwrap();
        t.insert(&disc, (7, 'c'), false).unwrap();

        let mut run = Vec::new();
        let mut at = t.find(&disc, &7);
        while let Some(idx) = at {
            run.push(t.get(idx).unwrap().1);
            at = t.next(idx);
        }
        assert_eq!(run, vec!['a', 'b', 'c']);
    }

    #[test]
    fn remove_exact_mid_run() {
        fn key_of(p: &(u64, char)) -> &u64 {
            &p.0
        }
        let disc = ByKey::new(key_of as fn(&(u64, char)) -> &u64);
        let mut t = SkipTable::new();
        let _a = t.insert(&disc, (7, 'a'), false).unwrap();
        let b = t.insert(&disc, (7, 'b'), false).unwrap();
        let _c = t.insert(&disc, (7, 'c'), false).unwrap();

        assert_eq!(t.remove(&disc, b), Some((7, 'b')));
        assert_eq!(t.remove(&disc, b), None);
        let mut run = Vec::new();
        let mut at = t.find(&disc, &7);
        while let Some(idx) = at {
            run.push(t.get(idx).unwrap().1);
            at = t.next(idx);
        }
        assert_eq!(run, vec!['a', 'c']);
    }

    #[test]
    fn prev_walks_backward() {
        let mut t = SkipTable::new();
        for v in [10u64, 20, 30] {
            t.insert(&Natural, v, true).unwrap();
        }
        let last = t.last().unwrap();
        assert_eq!(t.get(last), Some(&30));
        let mid = t.prev(&Natural, last).unwrap();
        assert_eq!(t.get(mid), Some(&20));
        let first = t.prev(&Natural, mid).unwrap();
        assert_eq!(t.get(first), Some(&10));
        assert_eq!(t.prev(&Natural, first), None);
    }

    #[test]
    fn install_replaces_leftmost() {
        fn key_of(p: &(u64, char)) -> &u64 {
            &p.0
        }
        let disc = ByKey::new(key_of as fn(&(u64, char)) -> &u64);
        let mut t = SkipTable::new();
        t.insert(&disc, (7, 'a'), false).unwrap();
        t.insert(&disc, (7, 'b'), false).unwrap();
        let (_, old) = t.install(&disc, (7, 'z'));
        assert_eq!(old, Some((7, 'a')));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn large_sorted_order_and_removals() {
        let mut t = SkipTable::new();
        let mut handles = Vec::new();
        for v in (0u64..500).rev() {
            handles.push((v, t.insert(&Natural, v, true).unwrap()));
        }
        assert_eq!(keys(&t), (0..500).collect::<Vec<_>>());
        assert!(t.height() >= 1);

        for (v, idx) in handles.into_iter().filter(|(v, _)| v % 3 == 0) {
            assert_eq!(t.remove(&Natural, idx), Some(v));
        }
        assert_eq!(keys(&t), (0..500).filter(|v| v % 3 != 0).collect::<Vec<_>>());
    }
}
