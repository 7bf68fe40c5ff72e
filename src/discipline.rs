//! Disciplines: how a dictionary sees the objects it stores.
//!
//! A discipline resolves an object's key, compares and hashes keys, disposes
//! of objects the dictionary retires, and receives lifecycle events. It is
//! the seam between the storage methods (which only ever deal in keys and
//! node links) and the application's object layout.
//!
//! Two ready-made disciplines cover the common cases:
//!
//! - [`Natural`] — the object is its own key, ordered by `Ord` and hashed
//!   with the default hasher.
//! - [`ByKey`] — the key is resolved by an accessor function, e.g. a field
//!   borrow.
//!
//! ```
//! use strata::{ByKey, Dict, Method};
//!
//! #[derive(Debug)]
//! struct User { name: String, uid: u32 }
//!
//! fn name_of(u: &User) -> &str { &u.name }
//!
//! let mut dict = Dict::open(ByKey::new(name_of as fn(&User) -> &str), Method::Set);
//! dict.insert(User { name: "root".into(), uid: 0 }).unwrap();
//! assert!(dict.find("root").is_some());
//! ```

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::event::{Event, EventAnswer};

/// Hashes a key with the crate's default hasher.
///
/// Used by [`Natural`] and [`ByKey`]; custom disciplines may call it from
/// their own `hash` when they only customize comparison.
pub fn default_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Describes how a dictionary extracts, compares, and hashes keys, and how
/// it disposes of objects it owns.
///
/// A discipline must be internally consistent: `compare` returning
/// [`Ordering::Equal`] for two keys implies `hash` returns the same value
/// for both. The hash methods rely on this to keep equal keys in one
/// bucket run.
pub trait Discipline<T> {
    /// The key type this discipline resolves from an object.
    type Key: ?Sized;

    /// Borrows the key out of an object. Must be O(1) and allocation-free.
    fn key<'a>(&self, obj: &'a T) -> &'a Self::Key;

    /// Three-way comparison of two keys.
    fn compare(&self, a: &Self::Key, b: &Self::Key) -> Ordering;

    /// Hash of a key. Must agree with `compare`.
    fn hash(&self, key: &Self::Key) -> u64;

    /// Disposes of an object the dictionary owns and is dropping: on
    /// `clear`, on close, and for objects displaced by `install` into
    /// nothing. The default just drops.
    fn retire(&self, obj: T) {
        drop(obj);
    }

    /// Receives a lifecycle event. The default accepts engine behavior.
    ///
    /// The callback has no access to the dictionary that raised the event;
    /// reacting to an event with further dictionary operations must happen
    /// after the current operation returns.
    fn on_event(&self, event: Event<'_>) -> EventAnswer {
        let _ = event;
        EventAnswer::Default
    }
}

/// Discipline for self-keyed objects: the object is its own key.
///
/// Comparison is `Ord`, hashing is the default hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + Hash> Discipline<T> for Natural {
    type Key = T;

    #[inline]
    fn key<'a>(&self, obj: &'a T) -> &'a T {
        obj
    }

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn hash(&self, key: &T) -> u64 {
        default_hash(key)
    }
}

/// Discipline whose key is resolved by an accessor function.
///
/// The accessor borrows the key out of the object. Named functions (or
/// explicit `fn` pointers) sidestep closure lifetime-inference issues:
///
/// ```
/// use strata::ByKey;
///
/// struct Entry { name: String, value: u64 }
/// fn key_of(e: &Entry) -> &str { &e.name }
///
/// let disc = ByKey::new(key_of as fn(&Entry) -> &str);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByKey<F> {
    accessor: F,
}

impl<F> ByKey<F> {
    /// Creates a discipline from a key accessor.
    pub fn new(accessor: F) -> Self {
        Self { accessor }
    }
}

impl<T, K, F> Discipline<T> for ByKey<F>
where
    K: ?Sized + Ord + Hash,
    F: for<'a> Fn(&'a T) -> &'a K,
{
    type Key = K;

    #[inline]
    fn key<'a>(&self, obj: &'a T) -> &'a K {
        (self.accessor)(obj)
    }

    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }

    #[inline]
    fn hash(&self, key: &K) -> u64 {
        default_hash(key)
    }
}

/// Compatibility assertions for an in-place discipline swap.
///
/// See [`Dict::swap_discipline`](crate::Dict::swap_discipline): on a
/// non-empty dictionary the structure built under the old discipline can
/// only be kept when the new one is asserted to agree with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMode {
    /// Keep the structure; the caller asserts which functions are
    /// equivalent between old and new discipline.
    AssertCompatible {
        /// Old and new `compare` order keys identically.
        same_compare: bool,
        /// Old and new `hash` produce identical values.
        same_hash: bool,
    },
    /// Tear the structure down and rebuild it under the new discipline.
    Rebuild,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_orders_and_hashes() {
        let d = Natural;
        assert_eq!(Discipline::<u64>::compare(&d, &1, &2), Ordering::Less);
        assert_eq!(
            Discipline::<u64>::hash(&d, &7),
            Discipline::<u64>::hash(&d, &7)
        );
    }

    #[test]
    fn by_key_borrows_field() {
        struct Pair {
            name: String,
            #[allow(dead_code)]
            value: u64,
        }
        fn key_of(p: &Pair) -> &str {
            &p.name
        }
        let d = ByKey::new(key_of as fn(&Pair) -> &str);
        let p = Pair { name: "k".into(), value: 1 };
        assert_eq!(d.key(&p), "k");
        assert_eq!(d.compare("a", "b"), Ordering::Less);
    }

    #[test]
    fn equal_keys_hash_equal() {
        let a = default_hash("alpha");
        let b = default_hash("alpha");
        assert_eq!(a, b);
        assert_ne!(default_hash("alpha"), default_hash("beta"));
    }
}
