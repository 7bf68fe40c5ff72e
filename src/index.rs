//! Sentinel-based node indices and the public object handle.
//!
//! Structures in this crate thread objects together with `u32` indices into a
//! node pool instead of pointers. A reserved sentinel (`u32::MAX`) stands in
//! for "no node", saving the space an `Option` tag would cost in every link
//! slot.

use core::fmt;

/// Internal pool index with a reserved sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Idx(u32);

impl Idx {
    /// Sentinel value representing "no node" / null link.
    pub(crate) const NONE: Idx = Idx(u32::MAX);

    #[inline]
    pub(crate) fn from_usize(val: usize) -> Idx {
        debug_assert!(val < u32::MAX as usize, "pool index overflow");
        Idx(val as u32)
    }

    #[inline]
    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the sentinel value.
    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Idx::NONE
    }

    /// Converts to `Option` for public-facing returns.
    #[inline]
    pub(crate) fn get(self) -> Option<Idx> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("Idx(NONE)")
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}

/// Stable identity of an object stored in a dictionary.
///
/// A handle is returned by the insert operations and stays valid until the
/// object is removed, the dictionary is cleared, or its contents are
/// extracted. Rehashing and method-internal reorganization never invalidate
/// a handle — only bucket or link placement changes.
///
/// Handles are only meaningful on the dictionary that issued them; using a
/// handle on another dictionary yields `None` or an unrelated object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Handle(pub(crate) Idx);

impl Handle {
    #[inline]
    pub(crate) fn idx(self) -> Idx {
        self.0
    }
}
