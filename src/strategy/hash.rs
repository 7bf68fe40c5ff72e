//! Hash family: a chained hash table over the node pool.
//!
//! Backs the `Set`, `Bag`, `SharableSet`, and `SharableBag` methods. Each
//! node caches its key's hash, so rehashing redistributes chains without
//! touching keys and membership tests skip the comparator on hash
//! mismatches. Equal keys are kept adjacent in one run within a chain,
//! which gives the bag methods their first-of-run / last-of-run probes and
//! one-pass duplicate deletion.
//!
//! Growth policy is the dictionary layer's business: it watches
//! [`HashTable::should_grow`], negotiates the target slot count through the
//! hash-size event, and calls [`HashTable::rehash`]. Handles are stable
//! across a rehash — only bucket placement changes.

use slab::Slab;

use crate::discipline::Discipline;
use crate::index::Idx;

/// Bucket count used when the discipline does not override the initial
/// sizing hint.
pub(crate) const DEFAULT_SLOTS: usize = 64;
const MIN_SLOTS: usize = 4;

/// Chains longer than this on average trigger a growth hint.
const LOAD_FACTOR: usize = 2;

#[derive(Debug)]
pub(crate) struct HashNode<T> {
    pub(crate) obj: T,
    hash: u64,
    next: Idx,
}

#[derive(Debug)]
pub(crate) struct HashTable<T> {
    nodes: Slab<HashNode<T>>,
    buckets: Vec<Idx>,
}

impl<T> HashTable<T> {
    pub(crate) fn with_slots(slots: usize) -> Self {
        let slots = slots.max(MIN_SLOTS).next_power_of_two();
        Self {
            nodes: Slab::new(),
            buckets: vec![Idx::NONE; slots],
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, idx: Idx) -> Option<&T> {
        self.nodes.get(idx.as_usize()).map(|n| &n.obj)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        self.nodes.get_mut(idx.as_usize()).map(|n| &mut n.obj)
    }

    /// First member of the equal-key run for `key`, if any.
    pub(crate) fn find<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let hash = disc.hash(key);
        let mut at = self.buckets[self.bucket_of(hash)];
        while let Some(idx) = at.get() {
            let node = &self.nodes[idx.as_usize()];
            if node.hash == hash && disc.compare(disc.key(&node.obj), key).is_eq() {
                return Some(idx);
            }
            at = node.next;
        }
        None
    }

    /// Last member of the equal-key run for `key`, if any.
    pub(crate) fn find_last<D>(&self, disc: &D, key: &D::Key) -> Option<Idx>
    where
        D: Discipline<T>,
    {
        let mut at = self.find(disc, key)?;
        loop {
            let node = &self.nodes[at.as_usize()];
            match node.next.get() {
                Some(next) => {
                    let peer = &self.nodes[next.as_usize()];
                    if peer.hash == node.hash
                        && disc.compare(disc.key(&peer.obj), disc.key(&node.obj)).is_eq()
                    {
                        at = next;
                        continue;
                    }
                }
                None => {}
            }
            return Some(at);
        }
    }

    /// Inserts `obj`. With `unique`, an existing equal key rejects the new
    /// object, which is handed back alongside the incumbent's index.
    /// Without it, the new object joins the end of its equal-key run (or
    /// the front of the chain when the key is new).
    pub(crate) fn insert<D>(&mut self, disc: &D, obj: T, unique: bool) -> Result<Idx, (Idx, T)>
    where
        D: Discipline<T>,
    {
        let hash = disc.hash(disc.key(&obj));
        let bucket = self.bucket_of(hash);
        let run = self.run_end(disc, bucket, hash, disc.key(&obj));
        match run {
            Some((first, last)) => {
                if unique {
                    return Err((first, obj));
                }
                let after = self.nodes[last.as_usize()].next;
                let idx = Idx::from_usize(self.nodes.insert(HashNode { obj, hash, next: after }));
                self.nodes[last.as_usize()].next = idx;
                Ok(idx)
            }
            None => {
                let head = self.buckets[bucket];
                let idx = Idx::from_usize(self.nodes.insert(HashNode { obj, hash, next: head }));
                self.buckets[bucket] = idx;
                Ok(idx)
            }
        }
    }

    /// Insert-or-replace: swaps the object of the run's first member,
    /// returning the displaced object, or inserts when the key is new.
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

    /// Removes the first member of the equal-key run for `key`.
    pub(crate) fn delete<D>(&mut self, disc: &D, key: &D::Key) -> Option<T>
    where
        D: Discipline<T>,
    {
        let idx = self.find(disc, key)?;
        self.remove(idx)
    }

    /// Removes the exact node at `idx`, if present.
    pub(crate) fn remove(&mut self, idx: Idx) -> Option<T> {
        if !self.nodes.contains(idx.as_usize()) {
            return None;
        }
        let hash = self.nodes[idx.as_usize()].hash;
        let bucket = self.bucket_of(hash);
        // Unlink from the chain before releasing the slot.
        let mut at = self.buckets[bucket];
        let mut prev = Idx::NONE;
        while let Some(cur) = at.get() {
            if cur == idx {
                let next = self.nodes[cur.as_usize()].next;
                match prev.get() {
                    Some(p) => self.nodes[p.as_usize()].next = next,
                    None => self.buckets[bucket] = next,
                }
                return Some(self.nodes.remove(cur.as_usize()).obj);
            }
            prev = at;
            at = self.nodes[cur.as_usize()].next;
        }
        None
    }

    /// Consumes the node at `idx` without unlinking it from its chain,
    /// returning the object and the traversal successor. Only valid while
    /// draining the whole table in bucket order; the table is unusable
    /// afterwards.
    pub(crate) fn detach_step(&mut self, idx: Idx) -> (T, Idx) {
        let next = self.next(idx).unwrap_or(Idx::NONE);
        (self.nodes.remove(idx.as_usize()).obj, next)
    }

    /// `true` once the average chain length crosses the load factor.
    #[inline]
    pub(crate) fn should_grow(&self) -> bool {
        self.nodes.len() > LOAD_FACTOR * self.buckets.len()
    }

    /// Doubling proposal for the next table size.
    #[inline]
    pub(crate) fn grow_proposal(&self) -> usize {
        self.buckets.len() * 2
    }

    /// Rebuilds the bucket array at `slots` slots, redistributing every
    /// chain. Node slots (and therefore handles) are untouched; equal-key
    /// runs stay adjacent because run members share a hash and are walked
    /// consecutively.
    pub(crate) fn rehash(&mut self, slots: usize) {
        let slots = slots.max(MIN_SLOTS).next_power_of_two();
        let old = core::mem::replace(&mut self.buckets, vec![Idx::NONE; slots]);
        for head in old {
            let mut at = head;
            while let Some(idx) = at.get() {
                let next = self.nodes[idx.as_usize()].next;
                let bucket = self.bucket_of(self.nodes[idx.as_usize()].hash);
                self.nodes[idx.as_usize()].next = self.buckets[bucket];
                self.buckets[bucket] = idx;
                at = next;
            }
        }
    }

    // ------------------------------------------------------------------
    // Order traversal (bucket order, then chain order)
    // ------------------------------------------------------------------

    pub(crate) fn first(&self) -> Option<Idx> {
        self.buckets.iter().find_map(|head| head.get())
    }

    pub(crate) fn last(&self) -> Option<Idx> {
        let head = self.buckets.iter().rev().find_map(|head| head.get())?;
        Some(self.chain_tail(head))
    }

    pub(crate) fn next(&self, idx: Idx) -> Option<Idx> {
        let node = self.nodes.get(idx.as_usize())?;
        if let Some(next) = node.next.get() {
            return Some(next);
        }
        let bucket = self.bucket_of(node.hash);
        self.buckets[bucket + 1..].iter().find_map(|head| head.get())
    }

    pub(crate) fn prev(&self, idx: Idx) -> Option<Idx> {
        let node = self.nodes.get(idx.as_usize())?;
        let bucket = self.bucket_of(node.hash);
        let mut at = self.buckets[bucket];
        let mut prev = Idx::NONE;
        while let Some(cur) = at.get() {
            if cur == idx {
                break;
            }
            prev = at;
            at = self.nodes[cur.as_usize()].next;
        }
        if let Some(p) = prev.get() {
            return Some(p);
        }
        let head = self.buckets[..bucket]
            .iter()
            .rev()
            .find_map(|head| head.get())?;
        Some(self.chain_tail(head))
    }

    pub(crate) fn clear_with(&mut self, mut retire: impl FnMut(T)) {
        for head in self.buckets.iter_mut() {
            *head = Idx::NONE;
        }
        for (_, node) in core::mem::take(&mut self.nodes) {
            retire(node.obj);
        }
    }

    /// Approximate heap footprint of the structure in bytes.
    pub(crate) fn space(&self) -> usize {
        self.nodes.capacity() * core::mem::size_of::<HashNode<T>>()
            + self.buckets.len() * core::mem::size_of::<Idx>()
            + core::mem::size_of::<Self>()
    }

    /// Chain length of every bucket, for the stat report.
    pub(crate) fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(|head| {
            let mut len = 0;
            let mut at = *head;
            while let Some(idx) = at.get() {
                len += 1;
                at = self.nodes[idx.as_usize()].next;
            }
            len
        })
    }

    fn chain_tail(&self, head: Idx) -> Idx {
        let mut at = head;
        loop {
            let next = self.nodes[at.as_usize()].next;
            match next.get() {
                Some(n) => at = n,
                None => return at,
            }
        }
    }

    /// Locates the equal-key run in `bucket`, returning its first and last
    /// member.
    fn run_end<D>(&self, disc: &D, bucket: usize, hash: u64, key: &D::Key) -> Option<(Idx, Idx)>
    where
        D: Discipline<T>,
    {
        let mut at = self.buckets[bucket];
        while let Some(idx) = at.get() {
            let node = &self.nodes[idx.as_usize()];
            if node.hash == hash && disc.compare(disc.key(&node.obj), key).is_eq() {
                let first = idx;
                let mut last = idx;
                let mut peer = node.next;
                while let Some(p) = peer.get() {
                    let pn = &self.nodes[p.as_usize()];
                    if pn.hash != hash || !disc.compare(disc.key(&pn.obj), key).is_eq() {
                        break;
                    }
                    last = p;
                    peer = pn.next;
                }
                return Some((first, last));
            }
            at = node.next;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discipline::Natural;

    fn table() -> HashTable<u64> {
        HashTable::with_slots(DEFAULT_SLOTS)
    }

    #[test]
    fn unique_insert_rejects_duplicate() {
        let mut t = table();
        let a = t.insert(&Natural, 7, true).unwrap();
        match t.insert(&Natural, 7, true) {
            Err((existing, rejected)) => {
                assert_eq!(existing, a);
                assert_eq!(rejected, 7);
            }
            Ok(_) => panic!("duplicate accepted"),
        }
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn bag_keeps_runs_adjacent() {
        let mut t = table();
        t.insert(&Natural, 1, false).unwrap();
        let first = t.insert(&Natural, 7, false).unwrap();
        t.insert(&Natural, 2, false).unwrap();
        let second = t.insert(&Natural, 7, false).unwrap();
        let third = t.insert(&Natural, 7, false).unwrap();

        assert_eq!(t.len(), 5);
        assert_eq!(t.find(&Natural, &7), Some(first));
        assert_eq!(t.find_last(&Natural, &7), Some(third));
        // Run is chained first -> second -> third.
        assert_eq!(t.next(first), Some(second));
        assert_eq!(t.next(second), Some(third));
    }

    #[test]
    fn install_replaces_in_place() {
        let mut t = table();
        let a = t.insert(&Natural, 7, true).unwrap();
        let (idx, old) = t.install(&Natural, 7);
        assert_eq!(idx, a);
        assert_eq!(old, Some(7));
        assert_eq!(t.len(), 1);

        let (_, old) = t.install(&Natural, 9);
        assert_eq!(old, None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn delete_takes_first_of_run() {
        let mut t = table();
        let first = t.insert(&Natural, 7, false).unwrap();
        let second = t.insert(&Natural, 7, false).unwrap();
        assert_eq!(t.delete(&Natural, &7), Some(7));
        assert!(t.get(first).is_none());
        assert_eq!(t.find(&Natural, &7), Some(second));
    }

    #[test]
    fn remove_exact_node() {
        let mut t = table();
        let a = t.insert(&Natural, 1, true).unwrap();
        let b = t.insert(&Natural, 2, true).unwrap();
        assert_eq!(t.remove(b), Some(2));
        assert_eq!(t.remove(b), None);
        assert_eq!(t.get(a), Some(&1));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn rehash_preserves_handles_and_membership() {
        let mut t = HashTable::with_slots(4);
        let handles: Vec<_> = (0u64..64)
            .map(|v| t.insert(&Natural, v, true).unwrap())
            .collect();
        assert!(t.should_grow());
        t.rehash(t.grow_proposal());
        assert_eq!(t.slots(), 8);
        for (v, idx) in handles.iter().enumerate() {
            assert_eq!(t.get(*idx), Some(&(v as u64)));
            assert_eq!(t.find(&Natural, &(v as u64)), Some(*idx));
        }
    }

    #[test]
    fn traversal_covers_all_nodes_both_ways() {
        let mut t = HashTable::with_slots(8);
        for v in 0u64..20 {
            t.insert(&Natural, v, true).unwrap();
        }
        let mut forward = Vec::new();
        let mut at = t.first();
        while let Some(idx) = at {
            forward.push(*t.get(idx).unwrap());
            at = t.next(idx);
        }
        assert_eq!(forward.len(), 20);

        let mut backward = Vec::new();
        let mut at = t.last();
        while let Some(idx) = at {
            backward.push(*t.get(idx).unwrap());
            at = t.prev(idx);
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn clear_retires_all() {
        let mut t = table();
        for v in 0u64..10 {
            t.insert(&Natural, v, true).unwrap();
        }
        let mut n = 0;
        t.clear_with(|_| n += 1);
        assert_eq!(n, 10);
        assert_eq!(t.len(), 0);
        assert!(t.first().is_none());
    }
}
