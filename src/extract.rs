//! Bulk transfer: the extracted contents of a dictionary.
//!
//! [`Dict::extract`](crate::Dict::extract) detaches a dictionary's entire
//! contents in O(1) — the structure is moved out wholesale, no per-object
//! walk happens until the payload is consumed. An [`Extracted`] can be
//! drained in the source's natural order, or handed to
//! [`Dict::restore`](crate::Dict::restore), which reinserts every object
//! under the *target* dictionary's current method — the supported way to
//! migrate a population between storage strategies.

use crate::index::Idx;
use crate::strategy::Repr;

/// Contents detached from a dictionary, in the source's natural order.
///
/// Dropping an `Extracted` drops the remaining objects; the source
/// discipline's `retire` hook is not involved — ownership left the
/// dictionary at extraction time.
#[derive(Debug)]
pub struct Extracted<T> {
    repr: Repr<T>,
}

impl<T> Extracted<T> {
    pub(crate) fn new(repr: Repr<T>) -> Self {
        Self { repr }
    }

    /// Number of objects carried.
    pub fn len(&self) -> usize {
        self.repr.len()
    }

    /// `true` if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.repr.len() == 0
    }
}

impl<T> IntoIterator for Extracted<T> {
    type Item = T;
    type IntoIter = Drain<T>;

    fn into_iter(self) -> Drain<T> {
        let at = self.repr.first().unwrap_or(Idx::NONE);
        Drain { repr: self.repr, at }
    }
}

/// Draining iterator over extracted contents, in natural order.
#[derive(Debug)]
pub struct Drain<T> {
    repr: Repr<T>,
    at: Idx,
}

impl<T> Iterator for Drain<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let idx = self.at.get()?;
        let (obj, next) = self.repr.detach_step(idx);
        self.at = next;
        Some(obj)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.repr.len();
        (n, Some(n))
    }
}

impl<T> ExactSizeIterator for Drain<T> {}
