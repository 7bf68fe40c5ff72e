//! The dictionary handle: one operation surface over every storage method.
//!
//! A [`Dict`] binds a [`Discipline`] and a [`Method`] to a storage family
//! state. All operations go through the handle; the method decides order,
//! duplicate tolerance, and cost. Read operations take `&self` and may run
//! concurrently from any number of threads; mutations take `&mut self`, so
//! a writer statically excludes every reader — the exclusion the sharable
//! methods need around rehashing is enforced by the borrow checker rather
//! than a runtime flag.
//!
//! ```
//! use strata::{Dict, Method, Natural};
//!
//! let mut dict = Dict::open(Natural, Method::OrderedSet);
//! for v in [5u64, 1, 3] {
//!     dict.insert(v).unwrap();
//! }
//! let sorted: Vec<u64> = dict.iter().copied().collect();
//! assert_eq!(sorted, vec![1, 3, 5]);
//! assert_eq!(dict.at_least(&2), Some(&3));
//! ```

use core::any::Any;
use core::fmt;
use core::ops::ControlFlow;
use std::sync::{RwLock, Weak};

use crate::discipline::{Discipline, SwapMode};
use crate::error::{DictError, Full};
use crate::event::{Event, EventAnswer, Severity};
use crate::extract::Extracted;
use crate::index::{Handle, Idx};
use crate::method::{Family, Method};
use crate::stat::Stat;
use crate::strategy::{hash, HashTable, Repr, SeqList, SkipTable};

/// Outcome of [`Dict::insert`] / [`Dict::append`].
#[derive(Debug, PartialEq, Eq)]
pub enum Placed<T> {
    /// The object was stored; the handle is its stable identity.
    Inserted(Handle),
    /// A unique-key method already held this key. The incumbent stays; the
    /// new object comes back to the caller. An ordinary result, not an
    /// error.
    Duplicate {
        /// Handle of the incumbent object with the equal key.
        existing: Handle,
        /// The object that was not stored.
        rejected: T,
    },
}

impl<T> Placed<T> {
    /// Handle of the stored or incumbent object.
    pub fn handle(&self) -> Handle {
        match self {
            Placed::Inserted(h) => *h,
            Placed::Duplicate { existing, .. } => *existing,
        }
    }

    /// `true` if the object was stored.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Placed::Inserted(_))
    }
}

/// Outcome of [`Dict::install`].
#[derive(Debug, PartialEq, Eq)]
pub struct Installed<T> {
    /// Handle of the installed object.
    pub handle: Handle,
    /// The object displaced by the install, if the key was present.
    pub replaced: Option<T>,
}

/// Key probe selector for [`Dict::probe`] and the view-chain
/// [`lookup`](Dict::lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Exact key match (first of the equal run on duplicate-tolerant
    /// methods).
    Exact,
    /// Smallest key >= the probe (ordered methods O(log n); hash methods
    /// treat this as first-of-run; sequences scan for the closest).
    AtLeast,
    /// Largest key <= the probe.
    AtMost,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    at: Idx,
    generation: u64,
}

/// A dictionary: a discipline, a method, and the stored objects.
pub struct Dict<T, D: Discipline<T>> {
    disc: D,
    method: Method,
    repr: Repr<T>,
    pub(crate) view: Option<Weak<RwLock<Dict<T, D>>>>,
    cursor: Option<Cursor>,
    generation: u64,
    capacity: Option<usize>,
    user_data: Option<Box<dyn Any + Send + Sync>>,
}

impl<T, D: Discipline<T>> Dict<T, D> {
    /// Opens an empty dictionary with unbounded capacity.
    pub fn open(disc: D, method: Method) -> Self {
        Self::build(disc, method, None)
    }

    /// Opens an empty dictionary that refuses to grow past `capacity`
    /// objects: inserts beyond it return [`Full`] with the rejected object
    /// and leave the dictionary untouched.
    pub fn open_bounded(disc: D, method: Method, capacity: usize) -> Self {
        Self::build(disc, method, Some(capacity))
    }

    fn build(disc: D, method: Method, capacity: Option<usize>) -> Self {
        disc.on_event(Event::Opening { method });
        let repr = Self::make_repr(&disc, method);
        let dict = Self {
            disc,
            method,
            repr,
            view: None,
            cursor: None,
            generation: 0,
            capacity,
            user_data: None,
        };
        dict.disc.on_event(Event::Opened { method });
        dict
    }

    /// Builds an empty family state, negotiating hash sizing through the
    /// discipline's event callback.
    fn make_repr(disc: &D, method: Method) -> Repr<T> {
        match method.family() {
            Family::Hash => {
                let proposed = hash::DEFAULT_SLOTS;
                let slots = match disc.on_event(Event::HashSize { proposed }) {
                    EventAnswer::HashSize(n) if n > 0 => n,
                    _ => proposed,
                };
                Repr::Hash(HashTable::with_slots(slots))
            }
            Family::Skip => Repr::Skip(SkipTable::new()),
            Family::Seq => Repr::Seq(SeqList::new()),
        }
    }

    /// Empty state of the same family, without re-raising sizing events.
    /// Hash tables keep their current slot count.
    fn fresh_repr(&self) -> Repr<T> {
        match &self.repr {
            Repr::Hash(t) => Repr::Hash(HashTable::with_slots(t.slots())),
            Repr::Skip(_) => Repr::Skip(SkipTable::new()),
            Repr::Seq(_) => Repr::Seq(SeqList::new()),
        }
    }

    /// Closes the dictionary, retiring all contents.
    ///
    /// Dropping the dictionary does the same; `close` only makes the point
    /// explicit at call sites. Double-close cannot be expressed.
    pub fn close(self) {}

    // ==================================================================
    // Introspection
    // ==================================================================

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.repr.len()
    }

    /// `true` if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.repr.len() == 0
    }

    /// The active storage method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The active discipline.
    pub fn discipline(&self) -> &D {
        &self.disc
    }

    /// The capacity bound, if one was set at open.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    #[inline]
    fn has_room(&self) -> bool {
        self.capacity.map_or(true, |cap| self.repr.len() < cap)
    }

    #[inline]
    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    // ==================================================================
    // Insertion
    // ==================================================================

    /// Inserts an object at the method's insert position: hash and ordered
    /// methods place by key (unique-key methods reject duplicates by
    /// returning [`Placed::Duplicate`]), sequences push at the head.
    pub fn insert(&mut self, obj: T) -> Result<Placed<T>, Full<T>> {
        if !self.has_room() {
            return Err(Full(obj));
        }
        let unique = self.method.unique_keys();
        let disc = &self.disc;
        let placed = match &mut self.repr {
            Repr::Hash(t) => match t.insert(disc, obj, unique) {
                Ok(idx) => Placed::Inserted(Handle(idx)),
                Err((existing, rejected)) => Placed::Duplicate {
                    existing: Handle(existing),
                    rejected,
                },
            },
            Repr::Skip(t) => match t.insert(disc, obj, unique) {
                Ok(idx) => Placed::Inserted(Handle(idx)),
                Err((existing, rejected)) => Placed::Duplicate {
                    existing: Handle(existing),
                    rejected,
                },
            },
            Repr::Seq(t) => Placed::Inserted(Handle(t.push_front(obj))),
        };
        if placed.is_inserted() {
            self.touch();
            self.maybe_grow();
        }
        Ok(placed)
    }

    /// Inserts an object at the method's append position: the tail for
    /// `List`, `Queue`, and `Deque`, the top for `Stack`, and the key
    /// position (after any equals) for the keyed methods.
    pub fn append(&mut self, obj: T) -> Result<Placed<T>, Full<T>> {
        match self.method {
            Method::List | Method::Queue | Method::Deque => {
                if !self.has_room() {
                    return Err(Full(obj));
                }
                let idx = match &mut self.repr {
                    Repr::Seq(t) => t.push_back(obj),
                    _ => unreachable!("sequence method without sequence state"),
                };
                self.touch();
                Ok(Placed::Inserted(Handle(idx)))
            }
            _ => self.insert(obj),
        }
    }

    /// Insert-or-replace: if the key is present, the incumbent (leftmost of
    /// the equal run) is displaced in place and returned; otherwise the
    /// object is inserted as [`Dict::insert`] would.
    pub fn install(&mut self, obj: T) -> Result<Installed<T>, Full<T>> {
        let room = self.has_room();
        let disc = &self.disc;
        let (handle, replaced) = match &mut self.repr {
            Repr::Hash(t) => {
                let (idx, old) = t.install(disc, obj);
                (Handle(idx), old)
            }
            Repr::Skip(t) => {
                let (idx, old) = t.install(disc, obj);
                (Handle(idx), old)
            }
            Repr::Seq(t) => match t.find(disc, disc.key(&obj)) {
                Some(idx) => (Handle(idx), Some(t.replace(idx, obj))),
                None => {
                    if !room {
                        return Err(Full(obj));
                    }
                    (Handle(t.push_front(obj)), None)
                }
            },
        };
        let over_bound = self.capacity.map_or(false, |cap| self.repr.len() > cap);
        if replaced.is_none() && over_bound {
            // Keyed-family install grew the dictionary past its bound:
            // undo and report Full.
            let obj = self.remove(handle).expect("fresh install vanished");
            return Err(Full(obj));
        }
        self.touch();
        self.maybe_grow();
        Ok(Installed { handle, replaced })
    }

    fn maybe_grow(&mut self) {
        if let Repr::Hash(t) = &mut self.repr {
            if t.should_grow() {
                let proposed = t.grow_proposal();
                let slots = match self.disc.on_event(Event::HashSize { proposed }) {
                    EventAnswer::HashSize(n) if n > 0 => n,
                    _ => proposed,
                };
                // Answering with the current slot count (or less) vetoes
                // the growth.
                if slots > t.slots() {
                    t.rehash(slots);
                }
            }
        }
    }

    // ==================================================================
    // Removal
    // ==================================================================

    /// Removes one object matching `key` (the first of the equal run) and
    /// returns it.
    pub fn delete(&mut self, key: &D::Key) -> Option<T> {
        let disc = &self.disc;
        let out = match &mut self.repr {
            Repr::Hash(t) => t.delete(disc, key),
            Repr::Skip(t) => t.delete(disc, key),
            Repr::Seq(t) => {
                let idx = t.find(disc, key)?;
                t.remove(idx)
            }
        };
        if out.is_some() {
            self.touch();
        }
        out
    }

    /// Removes the exact object identified by `handle`, regardless of how
    /// many others share its key.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let disc = &self.disc;
        let out = match &mut self.repr {
            Repr::Hash(t) => t.remove(handle.idx()),
            Repr::Skip(t) => t.remove(disc, handle.idx()),
            Repr::Seq(t) => t.remove(handle.idx()),
        };
        if out.is_some() {
            self.touch();
        }
        out
    }

    /// Removes and returns the first object in natural order.
    pub fn pop_front(&mut self) -> Option<T> {
        if let Repr::Seq(t) = &mut self.repr {
            let out = t.pop_front();
            if out.is_some() {
                self.touch();
            }
            return out;
        }
        let idx = self.repr.first()?;
        self.remove(Handle(idx))
    }

    /// Removes and returns the last object in natural order.
    pub fn pop_back(&mut self) -> Option<T> {
        if let Repr::Seq(t) = &mut self.repr {
            let out = t.pop_back();
            if out.is_some() {
                self.touch();
            }
            return out;
        }
        let idx = self.repr.last()?;
        self.remove(Handle(idx))
    }

    /// Unspecified-target delete: the method decides the end. `Stack` pops
    /// the top (LIFO), `Queue` the tail (FIFO); everything else pops the
    /// front of natural order.
    pub fn pop(&mut self) -> Option<T> {
        match self.method {
            Method::Queue => self.pop_back(),
            _ => self.pop_front(),
        }
    }

    /// Retires every stored object, leaving the dictionary empty.
    pub fn clear(&mut self) {
        self.touch();
        self.cursor = None;
        let disc = &self.disc;
        self.repr.clear_with(|obj| disc.retire(obj));
    }

    // ==================================================================
    // Lookup (local)
    // ==================================================================

    /// Local key probe returning the matching object's handle.
    pub fn probe(&self, how: Lookup, key: &D::Key) -> Option<Handle> {
        let disc = &self.disc;
        let idx = match (&self.repr, how) {
            (Repr::Hash(t), Lookup::Exact) => t.find(disc, key),
            (Repr::Hash(t), Lookup::AtLeast) => t.find(disc, key),
            (Repr::Hash(t), Lookup::AtMost) => t.find_last(disc, key),
            (Repr::Skip(t), Lookup::Exact) => t.find(disc, key),
            (Repr::Skip(t), Lookup::AtLeast) => t.at_least(disc, key),
            (Repr::Skip(t), Lookup::AtMost) => t.at_most(disc, key),
            (Repr::Seq(t), Lookup::Exact) => t.find(disc, key),
            (Repr::Seq(t), how) => self.seq_scan(t, how, key),
        };
        idx.map(Handle)
    }

    /// Closest-key scan for the sequence methods, which keep no key order.
    fn seq_scan(&self, t: &SeqList<T>, how: Lookup, key: &D::Key) -> Option<Idx> {
        let disc = &self.disc;
        let mut best: Option<Idx> = None;
        let mut at = t.first();
        while let Some(idx) = at {
            let k = disc.key(t.get(idx).expect("scan index"));
            let ord = disc.compare(k, key);
            let admissible = match how {
                Lookup::AtLeast => ord.is_ge(),
                Lookup::AtMost => ord.is_le(),
                Lookup::Exact => ord.is_eq(),
            };
            if admissible {
                let better = match best {
                    None => true,
                    Some(b) => {
                        let bk = disc.key(t.get(b).expect("scan index"));
                        match how {
                            Lookup::AtLeast => disc.compare(k, bk).is_lt(),
                            _ => disc.compare(k, bk).is_gt(),
                        }
                    }
                };
                if better {
                    best = Some(idx);
                }
            }
            at = t.next(idx);
        }
        best
    }

    /// Borrows the first object matching `key`.
    pub fn find(&self, key: &D::Key) -> Option<&T> {
        let h = self.probe(Lookup::Exact, key)?;
        self.repr.get(h.idx())
    }

    /// Handle of the first object matching `key`.
    pub fn find_handle(&self, key: &D::Key) -> Option<Handle> {
        self.probe(Lookup::Exact, key)
    }

    /// `true` if some stored object matches `key`.
    pub fn contains(&self, key: &D::Key) -> bool {
        self.probe(Lookup::Exact, key).is_some()
    }

    /// Smallest stored key >= `key`. On an empty dictionary this is
    /// `None`, never an error.
    pub fn at_least(&self, key: &D::Key) -> Option<&T> {
        let h = self.probe(Lookup::AtLeast, key)?;
        self.repr.get(h.idx())
    }

    /// Largest stored key <= `key`.
    pub fn at_most(&self, key: &D::Key) -> Option<&T> {
        let h = self.probe(Lookup::AtMost, key)?;
        self.repr.get(h.idx())
    }

    /// Borrows the object behind a handle.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.repr.get(handle.idx())
    }

    /// Mutably borrows the object behind a handle.
    ///
    /// The borrow must not change the object's key: the structure was
    /// placed under the old key and is not rebuilt.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.repr.get_mut(handle.idx())
    }

    // ==================================================================
    // Order traversal
    // ==================================================================

    /// First object in the method's natural order.
    pub fn first(&self) -> Option<Handle> {
        self.repr.first().map(Handle)
    }

    /// Last object in the method's natural order.
    pub fn last(&self) -> Option<Handle> {
        self.repr.last().map(Handle)
    }

    /// Successor of `handle` in natural order.
    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.repr.next(handle.idx()).map(Handle)
    }

    /// Predecessor of `handle` in natural order.
    pub fn prev(&self, handle: Handle) -> Option<Handle> {
        let idx = match &self.repr {
            Repr::Hash(t) => t.prev(handle.idx()),
            Repr::Skip(t) => t.prev(&self.disc, handle.idx()),
            Repr::Seq(t) => t.prev(handle.idx()),
        };
        idx.map(Handle)
    }

    /// Visits every object in natural order until the visitor breaks.
    /// Returns the number of objects visited.
    pub fn walk(&self, mut visit: impl FnMut(&T) -> ControlFlow<()>) -> usize {
        let mut seen = 0;
        let mut at = self.repr.first();
        while let Some(idx) = at {
            seen += 1;
            if visit(self.repr.get(idx).expect("walk index")).is_break() {
                break;
            }
            at = self.repr.next(idx);
        }
        seen
    }

    /// Borrowing traversal in natural order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            repr: &self.repr,
            at: self.repr.first().unwrap_or(Idx::NONE),
        }
    }

    /// Read-only bulk export: every stored object, in natural order,
    /// without detaching anything. Alias of [`Dict::iter`] kept for
    /// symmetry with [`Dict::extract`].
    pub fn flatten(&self) -> Iter<'_, T> {
        self.iter()
    }

    // ==================================================================
    // Cursor iteration
    // ==================================================================

    /// Starts (or restarts) the dictionary's iteration cursor and returns
    /// the first object. At most one cursor is open per dictionary.
    pub fn iterate(&mut self) -> Option<Handle> {
        match self.repr.first() {
            Some(idx) => {
                self.cursor = Some(Cursor {
                    at: idx,
                    generation: self.generation,
                });
                Some(Handle(idx))
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }

    /// Steps the open cursor. `Ok(None)` ends (and closes) the loop. An
    /// insert or delete since the cursor was opened makes it stale:
    /// [`DictError::StaleCursor`] until the loop is stopped or restarted.
    pub fn iterate_step(&mut self) -> Result<Option<Handle>, DictError> {
        let cursor = self.cursor.ok_or(DictError::NoCursor)?;
        if cursor.generation != self.generation {
            self.disc.on_event(Event::Error {
                severity: Severity::Warning,
                message: "iteration cursor invalidated by a mutation",
            });
            return Err(DictError::StaleCursor);
        }
        match self.repr.next(cursor.at) {
            Some(idx) => {
                self.cursor = Some(Cursor {
                    at: idx,
                    generation: cursor.generation,
                });
                Ok(Some(Handle(idx)))
            }
            None => {
                self.cursor = None;
                Ok(None)
            }
        }
    }

    /// Closes the iteration cursor, if one is open.
    pub fn iterate_stop(&mut self) {
        self.cursor = None;
    }

    // ==================================================================
    // Bulk transfer
    // ==================================================================

    /// Detaches the entire contents in O(1), leaving the dictionary empty.
    /// The payload drains in this dictionary's natural order and can be
    /// [`restore`](Dict::restore)d into any dictionary.
    pub fn extract(&mut self) -> Extracted<T> {
        self.touch();
        self.cursor = None;
        let empty = self.fresh_repr();
        Extracted::new(core::mem::replace(&mut self.repr, empty))
    }

    /// Reinserts a previously extracted payload under *this* dictionary's
    /// method. Objects whose keys a unique-key method rejects are retired;
    /// the count of objects actually inserted is returned. On a bounded
    /// dictionary the whole payload is refused up front if it cannot fit.
    pub fn restore(&mut self, payload: Extracted<T>) -> Result<usize, Full<Extracted<T>>> {
        if let Some(cap) = self.capacity {
            if self.repr.len() + payload.len() > cap {
                return Err(Full(payload));
            }
        }
        let mut inserted = 0;
        for obj in payload {
            match self.restore_place(obj) {
                Ok(Placed::Inserted(_)) => inserted += 1,
                Ok(Placed::Duplicate { rejected, .. }) => self.disc.retire(rejected),
                Err(Full(obj)) => {
                    // Unreachable after the capacity precheck; retire
                    // rather than lose the object if it ever happens.
                    self.disc.retire(obj);
                }
            }
        }
        Ok(inserted)
    }

    /// Placement for one restored object. A payload drains top-first, so a
    /// stack is refilled from the bottom; pushing each object at the top
    /// would reverse it. Every other method takes its append position.
    fn restore_place(&mut self, obj: T) -> Result<Placed<T>, Full<T>> {
        match self.method {
            Method::Stack => {
                if !self.has_room() {
                    return Err(Full(obj));
                }
                let idx = match &mut self.repr {
                    Repr::Seq(t) => t.push_back(obj),
                    _ => unreachable!("sequence method without sequence state"),
                };
                self.touch();
                Ok(Placed::Inserted(Handle(idx)))
            }
            _ => self.append(obj),
        }
    }

    // ==================================================================
    // Discipline and method swaps
    // ==================================================================

    /// Replaces the discipline, returning the old one.
    ///
    /// On an empty dictionary any mode succeeds. On a non-empty one the
    /// structure built under the old discipline is kept only when the
    /// asserted compatibility covers the active family (hash methods need
    /// `same_compare` and `same_hash`; ordered methods need
    /// `same_compare`; sequences need nothing); `SwapMode::Rebuild`
    /// re-places everything under the new discipline instead. Anything
    /// else is refused with no change.
    pub fn swap_discipline(&mut self, new: D, mode: SwapMode) -> Result<D, DictError> {
        if !self.is_empty() {
            let compatible = match mode {
                SwapMode::Rebuild => true,
                SwapMode::AssertCompatible {
                    same_compare,
                    same_hash,
                } => match self.method.family() {
                    Family::Hash => same_compare && same_hash,
                    Family::Skip => same_compare,
                    Family::Seq => true,
                },
            };
            if !compatible {
                self.disc.on_event(Event::Error {
                    severity: Severity::Warning,
                    message: "discipline swap refused: assertions do not cover the method",
                });
                return Err(DictError::IncompatibleDiscipline);
            }
        }
        self.disc.on_event(Event::DisciplineChanging);
        let old = core::mem::replace(&mut self.disc, new);
        if matches!(mode, SwapMode::Rebuild) && !self.is_empty() {
            let payload = self.extract();
            let _ = self.restore(payload);
        }
        self.touch();
        Ok(old)
    }

    /// Switches the storage method, migrating all contents, and returns
    /// the previous method. Duplicate keys arriving at a unique-key method
    /// are retired, exactly as [`Dict::restore`] would.
    pub fn swap_method(&mut self, to: Method) -> Method {
        let from = self.method;
        if to == from {
            return from;
        }
        self.disc.on_event(Event::MethodChanging { from, to });
        let payload = self.extract();
        self.method = to;
        if !to.is_sharable() {
            self.user_data = None;
        }
        self.repr = Self::make_repr(&self.disc, to);
        let _ = self.restore(payload);
        from
    }

    // ==================================================================
    // User data (sharable methods)
    // ==================================================================

    /// Stores caller data on a sharable dictionary, returning any previous
    /// value. Refused with [`DictError::NotSharable`] on other methods.
    pub fn set_user_data(
        &mut self,
        data: Box<dyn Any + Send + Sync>,
    ) -> Result<Option<Box<dyn Any + Send + Sync>>, DictError> {
        if !self.method.is_sharable() {
            return Err(DictError::NotSharable);
        }
        Ok(self.user_data.replace(data))
    }

    /// Borrows the caller data slot.
    pub fn user_data(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.user_data.as_deref()
    }

    /// Takes the caller data out of the slot.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any + Send + Sync>> {
        self.user_data.take()
    }

    // ==================================================================
    // Statistics
    // ==================================================================

    /// Structural snapshot. Non-mutating and idempotent: two calls without
    /// an intervening mutation return identical reports.
    pub fn stat(&self) -> Stat {
        let size = self.repr.len();
        let space = self.repr.space();
        let mut level_size = Vec::new();
        let mut level_slots = Vec::new();
        let (max_level, top_slots) = match &self.repr {
            Repr::Hash(t) => {
                let mut max_chain = 0;
                for chain in t.chain_lengths() {
                    Stat::bump(&mut level_slots, chain);
                    for depth in 0..chain {
                        Stat::bump(&mut level_size, depth);
                    }
                    max_chain = max_chain.max(chain);
                }
                (max_chain, t.slots())
            }
            Repr::Skip(t) => {
                for level in t.node_levels() {
                    Stat::bump(&mut level_size, level);
                }
                (t.height(), 0)
            }
            Repr::Seq(t) => {
                if t.len() > 0 {
                    level_size.push(t.len());
                }
                (usize::from(t.len() > 0), 0)
            }
        };
        Stat {
            method: self.method,
            size,
            space,
            max_level,
            top_slots,
            level_size,
            level_slots,
            digest: Stat::digest_of(self.method, size, space, max_level, top_slots),
        }
    }
}

impl<T, D: Discipline<T>> Drop for Dict<T, D> {
    fn drop(&mut self) {
        self.disc.on_event(Event::Closing);
        let disc = &self.disc;
        self.repr.clear_with(|obj| disc.retire(obj));
        self.disc.on_event(Event::Closed);
    }
}

impl<T, D: Discipline<T>> fmt::Debug for Dict<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dict")
            .field("method", &self.method)
            .field("len", &self.repr.len())
            .field("capacity", &self.capacity)
            .field("viewed", &self.view.is_some())
            .finish()
    }
}

/// Borrowing iterator over a dictionary in natural order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    repr: &'a Repr<T>,
    at: Idx,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.at.get()?;
        self.at = self.repr.next(idx).unwrap_or(Idx::NONE);
        self.repr.get(idx)
    }
}
